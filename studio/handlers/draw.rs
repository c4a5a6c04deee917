use std::io::{Cursor, Read};

use serde::Deserialize;
use serde_json::json;
use tiny_http::{Request, Response};

use digit_sketch::{ActionError, Grid};

use crate::render::{caption_html, render_page, Page};
use crate::routes::{html_response, json_response, redirect};
use crate::state::{lock, FlashMessage, SharedState};

/// Body of `POST /draw/stroke`: move samples in canvas coordinates.
#[derive(Deserialize)]
struct StrokeBatch {
    samples: Vec<[f64; 2]>,
}

// ---------------------------------------------------------------------------
// GET /draw
// ---------------------------------------------------------------------------

pub fn handle_get(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(state);
    st.drawing.poll();
    let alert   = st.drawing.take_alert();
    let flash   = st.take_flash();
    let pending = st.drawing.is_pending();
    let cells   = cell_string(st.drawing.snapshot());
    let caption = caption_html(st.drawing.caption());
    let surface = st.surface_size;
    drop(st);

    let section = draw_section(surface, &cells, &caption);

    let page = render_page(Page::Draw, pending, alert.as_ref(), flash.as_ref(), |tmpl| {
        tmpl.replace("{{TAB_CONTENT}}", &section)
    });
    html_response(page)
}

// ---------------------------------------------------------------------------
// POST /draw/stroke
// ---------------------------------------------------------------------------

pub fn handle_stroke(request: &mut Request, state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut body = String::new();
    if request.as_reader().read_to_string(&mut body).is_err() {
        return json_response(400, json!({ "error": "unreadable body" }).to_string());
    }
    let batch: StrokeBatch = match serde_json::from_str(&body) {
        Ok(b)  => b,
        Err(e) => return json_response(400, json!({ "error": e.to_string() }).to_string()),
    };

    let mut st = lock(state);
    let mut changed = 0;
    for &[x, y] in &batch.samples {
        if st.drawing.pointer_move(x, y) {
            changed += 1;
        }
    }
    let cells = cell_string(st.drawing.snapshot());
    drop(st);

    json_response(200, json!({ "changed": changed, "cells": cells }).to_string())
}

// ---------------------------------------------------------------------------
// POST /draw/reset  and  POST /draw/recognize
// ---------------------------------------------------------------------------

pub fn handle_reset(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    lock(state).drawing.reset();
    redirect("/draw")
}

pub fn handle_recognize(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(state);
    if let Err(ActionError::Busy) = st.drawing.recognize_from_grid() {
        st.flash = Some(FlashMessage::info("Still waiting for the previous recognition."));
    }
    redirect("/draw")
}

/// Canvas, caption and the reset/recognize forms. The page script holds the
/// recognize form back until pending stroke samples have been posted.
fn draw_section(surface: f64, cells: &str, caption: &str) -> String {
    format!(
        r#"<canvas id="pad" width="{surface}" height="{surface}" data-cells="{cells}"></canvas>
{caption}
<div class="actions">
  <form method="POST" action="/draw/reset"><button type="submit" class="btn">Reset</button></form>
  <form method="POST" action="/draw/recognize" id="recognize-form"><button type="submit" class="btn btn-primary">Recognize</button></form>
</div>"#,
    )
}

/// Grid as 784 `0`/`1` characters, row-major, for the canvas script.
fn cell_string(grid: &Grid) -> String {
    grid.snapshot().iter().map(|&c| if c { '1' } else { '0' }).collect()
}
