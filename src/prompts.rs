//! Centralised prompt texts and tool-call JSON schemas.
//!
//! Every LLM prompt and structured-output schema lives here so they can be
//! audited and tuned in one place. The rest of the codebase imports from
//! `crate::prompts`.

// ---------------------------------------------------------------------------
// ai.rs — classify_light
// ---------------------------------------------------------------------------

pub const LIGHT_SYSTEM_PROMPT: &str = r#"You are a horticultural assistant. You are shown a single photo of a houseplant in its spot. Estimate the ambient light level at that spot.

Judge from shadows, window proximity, highlight blowout, and overall exposure:
- "low": away from windows, deep soft shadows, dim corners
- "medium": bright indirect light, near a window but no direct sun on leaves
- "high": direct sun visible on leaves or hard shadows

Also rate how confident a human expert could be from this one photo:
- "low": photo is dark, blurry, heavily cropped, or artificially lit
- "medium": usable but ambiguous cues
- "high": clear, unambiguous lighting cues

One photo is weak evidence. When in doubt, lower the confidence rather than guessing harder."#;

pub fn classify_light_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "sunlight_level": {
                "type": "string",
                "enum": ["low", "medium", "high"],
                "description": "Estimated ambient light at the plant's spot"
            },
            "confidence": {
                "type": "string",
                "enum": ["low", "medium", "high"],
                "description": "How reliable this estimate is from a single photo"
            }
        },
        "required": ["sunlight_level", "confidence"]
    })
}

// ---------------------------------------------------------------------------
// ai.rs — generate_journal
// ---------------------------------------------------------------------------

pub const JOURNAL_SYSTEM_PROMPT: &str = r#"You are writing a short journal entry for a houseplant diary. You receive the plant's record, its recent care history, and the care event just logged (with photo if one was taken).

Write 2-4 warm, observational sentences in first person plural ("we watered the monstera today..."). Mention anything notable: growth, new leaves, drooping, soil condition. Never invent details not supported by the photo or the history. No emoji, no headings.

If a photo is included, also judge whether it plausibly depicts the plant on record (species, size, pot). If it clearly shows a different plant, say so in the verdict with your best guess at what it actually shows. If there is no photo or you cannot tell, omit the verdict entirely."#;

pub fn generate_journal_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "narrative": {
                "type": "string",
                "description": "The journal entry text, 2-4 sentences"
            },
            "identity_match": {
                "type": "object",
                "properties": {
                    "matches": {
                        "type": "boolean",
                        "description": "Whether the photo appears to depict the plant on record"
                    },
                    "detected_plant": {
                        "type": "string",
                        "description": "Best guess at the plant actually shown, when matches is false"
                    }
                },
                "required": ["matches"]
            }
        },
        "required": ["narrative"]
    })
}
