//! Inspection prompt and response schema.
//!
//! These are the contract between the inspector and the model.
//! The instruction is Thai because the model must answer in Thai.

use super::types::InspectionStatus;
use crate::capture::EncodedImage;
use serde_json::{json, Value};

/// Object type the model must report for an insulator.
pub const INSULATOR_OBJECT_TYPE: &str = "ลูกถ้วยไฟฟ้า";

/// Fixed instruction sent with every image.
///
/// Steps: identify the object, classify insulators only, score all three
/// conditions (0-100 each) for insulators only.
pub fn inspection_instruction() -> String {
    format!(
        r#"วิเคราะห์ภาพที่ให้มาตามขั้นตอนต่อไปนี้:
1. ระบุวัตถุหลักในภาพก่อน หากไม่ใช่ "{insulator}" ให้ตั้งค่า 'status' เป็น '{not_insulator}' ระบุชนิดของวัตถุที่พบใน 'objectType' (เช่น 'แมว') และให้คำอธิบายสั้นๆ ใน 'description' (เป็นภาษาไทย) ในกรณีนี้ ไม่ต้องมี 'confidenceScores'
2. หากวัตถุในภาพคือ "{insulator}" ให้ตั้งค่า 'objectType' เป็น '{insulator}' จากนั้นให้วิเคราะห์สภาพของมันและตั้งค่า 'status' เป็นหนึ่งใน: '{normal}', '{flashover}', หรือ '{broken}' พร้อมทั้งให้ 'description' ที่สอดคล้องกัน (เป็นภาษาไทย)
3. สำหรับกรณีที่เป็นลูกถ้วยไฟฟ้าเท่านั้น คุณต้องประเมินเปอร์เซ็นต์ความเชื่อมั่น (0-100) สำหรับแต่ละสถานะที่เป็นไปได้ทั้งหมด ('normal', 'flashover', 'broken') และใส่ไว้ใน object 'confidenceScores'

สำคัญ: ตอบกลับเป็น JSON ที่สอดคล้องกับ schema ที่กำหนดเท่านั้น"#,
        insulator = INSULATOR_OBJECT_TYPE,
        not_insulator = InspectionStatus::NotAnInsulator.label(),
        normal = InspectionStatus::Normal.label(),
        flashover = InspectionStatus::Flashover.label(),
        broken = InspectionStatus::Broken.label(),
    )
}

/// Gemini `responseSchema` restricting output to the verdict shape.
pub fn response_schema() -> Value {
    let statuses: Vec<&str> = InspectionStatus::MODEL_CHOICES
        .iter()
        .map(|s| s.label())
        .collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "status": {
                "type": "STRING",
                "enum": statuses,
                "description": "The condition of the object, or if it is not an insulator."
            },
            "objectType": {
                "type": "STRING",
                "description": "The type of object identified in the image (e.g., \"Electrical Insulator\", \"Cat\", \"Car\"). Provide this in Thai."
            },
            "description": {
                "type": "STRING",
                "description": "A brief explanation of the finding in Thai."
            },
            "confidenceScores": {
                "type": "OBJECT",
                "description": "Confidence scores for each insulator status. Only provide if the image is an insulator.",
                "properties": {
                    "normal": { "type": "NUMBER" },
                    "flashover": { "type": "NUMBER" },
                    "broken": { "type": "NUMBER" }
                },
                "required": ["normal", "flashover", "broken"]
            }
        },
        "required": ["status", "objectType", "description"]
    })
}

/// Full `generateContent` request body for one image.
pub fn build_request(image: &EncodedImage) -> Value {
    json!({
        "contents": [
            {
                "role": "user",
                "parts": [
                    { "text": inspection_instruction() },
                    {
                        "inlineData": {
                            "mimeType": image.media_type,
                            "data": image.data
                        }
                    }
                ]
            }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}
