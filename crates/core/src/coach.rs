//! Offline coach reply.
//!
//! Used when no model answer is available. The text follows the same shape a
//! model reply is asked for (goal, numbered steps, tips) so it renders through
//! the same block renderer.

use crate::context::{DesignContext, summarise_selection};

const GENERIC_STEPS: [&str; 4] = [
    "Identify which geometry or feature this question refers to (use the selection to be explicit).",
    "Locate the appropriate tool in Fusion's UI (toolbar panel or right-click menu).",
    "Adjust the key inputs (distance/angle/feature count/etc.) while watching the preview.",
    "Confirm the operation and inspect the result from a few camera angles.",
];

const TIPS: [&str; 3] = [
    "Make sure you are in the correct workspace for the tool you expect (e.g. Solid vs Surface).",
    "Select only the edges/faces you actually want to affect before running modify commands.",
    "If a command is greyed out, check that the right type of object is active (body vs component vs sketch).",
];

/// Build the structured fallback reply for `user_text`.
pub fn structured_reply(user_text: &str, ctx: &DesignContext) -> String {
    let doc_name = ctx.document_name().unwrap_or("your current design");
    let ws_name = ctx.workspace_name().unwrap_or("your current workspace");
    let selection = summarise_selection(&ctx.selection.clone().unwrap_or_default());

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("**Goal (from you):** {}", user_text.trim()));
    lines.push(String::new());
    lines.push(format!("**Where we are:** Working in {ws_name} on *{doc_name}*."));
    lines.push(selection);
    lines.push(String::new());
    lines.push("**What we're going to do next (generic template):**".to_string());
    for (i, step) in GENERIC_STEPS.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, step));
    }
    lines.push(String::new());
    lines.push("**Tips / common mistakes:**".to_string());
    for tip in TIPS {
        lines.push(format!("- {tip}"));
    }
    lines.push(String::new());
    lines.push(
        "If this doesn't match what you're trying to do, try re-asking with a bit more detail \
         about the feature or share what you currently have selected."
            .to_string(),
    );
    lines.join("\n")
}
