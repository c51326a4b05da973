//! Plain-text presentation of an inspection state.
//!
//! Mirrors the panels of the inspection screen: idle prompt, loading
//! notice, error panel with retry, verdict card with confidence bars.

use crate::llm::{ConfidenceScores, InspectionStatus, Verdict};
use crate::pipeline::InspectionState;
use std::fmt::Write;
use std::path::Path;

const BAR_WIDTH: usize = 20;

/// Render `state` for the terminal. `preview` is the analysed image, if any.
pub fn render(state: &InspectionState, preview: Option<&Path>) -> String {
    let mut out = String::new();
    match state {
        InspectionState::Idle => {
            out.push_str("Insulator Analyzer Pro\n");
            out.push_str("ถ่ายภาพหรืออัปโหลดรูปภาพลูกถ้วยไฟฟ้าเพื่อวิเคราะห์สถานะ\n");
            out.push_str("  capture <path>   ถ่ายภาพ\n");
            out.push_str("  upload <path>    อัปโหลดไฟล์\n");
        }
        InspectionState::Loading => {
            push_preview(&mut out, preview);
            out.push_str("กำลังวิเคราะห์ภาพ...\n");
            out.push_str("กรุณารอสักครู่ ระบบกำลังใช้โมเดลขั้นสูง\n");
        }
        InspectionState::Error(message) => {
            push_preview(&mut out, preview);
            out.push_str("เกิดข้อผิดพลาด\n");
            let _ = writeln!(out, "{}", message);
            out.push_str("ลองอีกครั้ง: retry\n");
        }
        InspectionState::Result(verdict) => {
            push_preview(&mut out, preview);
            render_verdict(&mut out, verdict);
            out.push_str("วิเคราะห์ภาพใหม่: reset\n");
        }
    }
    out
}

fn push_preview(out: &mut String, preview: Option<&Path>) {
    if let Some(path) = preview {
        let _ = writeln!(out, "[{}]", path.display());
    }
}

fn render_verdict(out: &mut String, verdict: &Verdict) {
    if verdict.status() == InspectionStatus::NotAnInsulator {
        let _ = writeln!(out, "{}", verdict.status().label());
        let _ = writeln!(
            out,
            "วัตถุในภาพถูกระบุว่าเป็น: {}",
            verdict.object_type()
        );
        let _ = writeln!(out, "{}", verdict.description());
        return;
    }

    let _ = writeln!(out, "ผลการวิเคราะห์: {}", verdict.status().label());
    let _ = writeln!(out, "{}", verdict.description());

    if let Some(scores) = verdict.confidence_scores() {
        out.push_str("ระดับความเชื่อมั่น\n");
        render_scores(out, scores);
    }
}

fn render_scores(out: &mut String, scores: &ConfidenceScores) {
    for (status, score) in scores.entries() {
        let _ = writeln!(
            out,
            "  {:<10} {} {:>5.1}%",
            status.label(),
            bar(score),
            score
        );
    }
}

fn bar(score: f64) -> String {
    let filled = ((score / ConfidenceScores::MAX) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}
