//! OCR clean-up prompt.
//!
//! Text recognised from a photographed essay is often broken mid-sentence or contains
//! misread characters. Before grading, the user may ask the model to smooth it out
//! without changing its meaning; this module renders that request.

use crate::error::MarkerError;

/// Renders the OCR refinement prompt for `ocr_text`.
///
/// Surrounding whitespace is trimmed. Blank input is rejected with
/// [`MarkerError::InvalidRequest`] so no model call is wasted on it.
pub fn compile_refinement(ocr_text: &str) -> Result<String, MarkerError> {
    let text = ocr_text.trim();
    if text.is_empty() {
        return Err(MarkerError::InvalidRequest(
            "text to refine must not be empty".to_string(),
        ));
    }

    Ok(format!(
        "請協助我改善以下從圖片辨識出來的文字，使其更通順、符合語意但不改變原本內容意思。\n請僅回傳修正後的段落，不需要解釋與格式說明。\n\n原始文字：\n{text}\n"
    ))
}
