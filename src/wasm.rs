use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn render_pdf(json: &str) -> Result<Vec<u8>, JsValue> {
    crate::render_json(json).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Pages the document renders to, as counted by the paginating writer.
#[wasm_bindgen]
pub fn estimate_pages(json: &str) -> Result<usize, JsValue> {
    let document: crate::model::Document =
        serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    crate::page_count(&document).map_err(|e| JsValue::from_str(&e.to_string()))
}
