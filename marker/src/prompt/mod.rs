//! # Prompt Compiler
//!
//! Renders a [`Rubric`] and a student's essay into the grading instruction sent to the
//! text generation service.
//!
//! The wording of the template is part of the contract with the model: the reply shape it
//! describes is exactly what [`GradingReplyParser`](crate::parsers::grading_parser::GradingReplyParser)
//! accepts. Any change here is a behavioural change and the pinned template test in this
//! module must be updated with it.
//!
//! Compilation is pure. The same `(title, rubric, essay)` always produces the same bytes,
//! and the essay text is embedded verbatim (never trimmed or truncated).

pub mod refinement;

use crate::rubric::{GradeBand, Part, Rubric};
use tracing::debug;

/// Essays shorter than this many characters are to be scored low across the board.
pub const SHORT_ESSAY_CHARS: usize = 100;

const PERSONA: &str = "你是一位專業的國文作文評分助教。請依照下列題目與評分標準，對學生的每一小題作文進行逐項評分，嚴格根據所提供的等第與分數範圍給出結果，並提供每一小題的理由。禁止自由創造等第、分數或格式。";

const FORMAT_INTRO: &str = "請使用以下格式回傳（JSON 格式，且不得有多餘文字）：";

const AUXILIARY_SHAPE: &str = r#"  "grammar_analysis": {
    "score": 整數，滿分 10 分,
    "comment": "針對文法分析的簡短評語"
  },
  "vocabulary_usage": {
    "score": 整數，滿分 10 分,
    "comment": "針對詞彙使用的簡短評語"
  },
  "structure_issues": {
    "score": 整數，滿分 10 分,
    "comment": "針對文章結構問題的簡短評語"
  },
  "summary": "整體評論，限 2~3 句，請簡明指出優點與可改善處。"
}
"#;

/// Compiles the grading prompt for one essay.
///
/// The caller resolves `rubric` from the [`RubricStore`](crate::rubric::store::RubricStore)
/// first; an unknown title never reaches this function.
///
/// # Example
///
/// ```rust
/// use marker::prompt::compile;
/// use marker::rubric::store::RubricStore;
///
/// let store = RubricStore::builtin().unwrap();
/// let title = "擬社會互動的特徵與影響";
/// let prompt = compile(title, store.lookup(title).unwrap(), "我的作文");
/// assert!(prompt.ends_with("我的作文"));
/// ```
pub fn compile(title: &str, rubric: &Rubric, essay_text: &str) -> String {
    let mut prompt = String::with_capacity(2048 + essay_text.len());

    prompt.push_str(PERSONA);
    prompt.push_str("\n\n");
    prompt.push_str(FORMAT_INTRO);
    prompt.push('\n');
    prompt.push_str(&reply_shape(rubric));
    prompt.push('\n');
    prompt.push_str(&rules());
    prompt.push('\n');
    prompt.push_str(&format!("作文題目：「{title}」\n\n"));
    prompt.push_str(&render_rubric(rubric));
    prompt.push_str("\n\n以下是學生作文內容：\n\n");
    prompt.push_str(essay_text);

    debug!(
        rubric = %rubric.title,
        parts = rubric.parts.len(),
        essay_chars = essay_text.chars().count(),
        "Compiled grading prompt"
    );
    prompt
}

/// Renders every part block, separated by blank lines.
pub fn render_rubric(rubric: &Rubric) -> String {
    rubric
        .parts
        .iter()
        .map(render_part)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Renders one part: a header followed by one line per grade band, best grade first.
pub fn render_part(part: &Part) -> String {
    let mut bands: Vec<&GradeBand> = part.bands.iter().collect();
    bands.sort_by(|a, b| b.grade.cmp(&a.grade));

    let mut lines = Vec::with_capacity(bands.len() + 1);
    lines.push(format!(
        "【{}】（占 {} 分）評分標準如下，請只從中選擇最適合的等第與分數範圍：",
        part.title, part.weight
    ));
    lines.extend(
        bands
            .iter()
            .map(|b| format!("- {}（{}分）：{}", b.grade, b.range_label, b.description)),
    );
    lines.join("\n")
}

/// The JSON reply shape, with one `parts` entry per rubric part.
fn reply_shape(rubric: &Rubric) -> String {
    let entries = rubric
        .parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let label = serde_json::Value::String(part.title.clone()).to_string();
            if i == 0 {
                format!(
                    "    {{\n      \"part\": {label},\n      \"grade\": \"等第（只能從該小題評分標準中擇一，如 A、B、C+ 等）\",\n      \"score\": 整數（必須落在所選等第的分數範圍內）,\n      \"reason\": \"簡潔說明為何給出此等第與分數，限 1~2 句。\"\n    }}"
                )
            } else {
                format!(
                    "    {{\n      \"part\": {label},\n      \"grade\": \"同上\",\n      \"score\": 整數,\n      \"reason\": \"同上\"\n    }}"
                )
            }
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "{{\n  \"total\": 總分（各小題分數的總和，滿分為 {}）,\n  \"parts\": [\n{entries}\n  ],\n{AUXILIARY_SHAPE}",
        rubric.total
    )
}

fn rules() -> String {
    [
        "請特別注意：".to_string(),
        "- 只輸出上述 JSON 物件，不可輸出任何額外說明、評論或 markdown（包含 ``` 區塊）".to_string(),
        "- 所有等第與分數，只能從下列評分標準中選擇，不可自創".to_string(),
        "- total 必須等於各小題 score 的總和".to_string(),
        "- grammar_analysis、vocabulary_usage、structure_issues 的 score 皆為 0 到 10 的整數".to_string(),
        "- 若格式錯誤，將視為評分失敗".to_string(),
        format!(
            "- 作文字數不到 {SHORT_ESSAY_CHARS} 字者，total 請給偏低的分數，grammar_analysis、vocabulary_usage、structure_issues 也都給很低分"
        ),
    ]
    .iter()
    .map(|line| format!("{line}\n"))
    .collect()
}
