use super::ui;
use crate::tool::{CurrencyTool, ToolOutcome, ToolReply};
use anyhow::Result;
use futures::future::join_all;

/// Renders one reply the way `fxq ask` prints it.
pub fn render_reply(query: &str, reply: &ToolReply, show_trace: bool) -> String {
    let mut output = format!("{}\n\n", ui::style_text(query, ui::StyleType::Title));

    match &reply.outcome {
        Ok(ToolOutcome::Converted { display, .. }) => output.push_str(display),
        Ok(ToolOutcome::NoIntent) => output.push_str(&ui::style_text(
            "No currency conversion found in this text.\n",
            ui::StyleType::Subtle,
        )),
        Err(e) => output.push_str(&format!(
            "{}\n",
            ui::style_text(&format!("Error: {e}"), ui::StyleType::Error)
        )),
    }

    if show_trace {
        output.push_str(&format!(
            "\n{}\n",
            ui::style_text("Resolution trace:", ui::StyleType::Subtle)
        ));
        for line in reply.trace().lines() {
            output.push_str(&format!(
                "  {}\n",
                ui::style_text(line, ui::StyleType::Subtle)
            ));
        }
    }
    output
}

/// Answers every query concurrently, then prints the replies in order.
pub async fn run(tool: &CurrencyTool, queries: &[String], show_trace: bool) -> Result<()> {
    let pb = ui::new_progress_bar(queries.len() as u64, true);
    pb.set_message("Fetching rates...");

    let reply_futures = queries.iter().map(|query| {
        let pb_clone = pb.clone();
        async move {
            let reply = tool.handle(query).await;
            pb_clone.inc(1);
            reply
        }
    });

    let replies = join_all(reply_futures).await;
    pb.finish_and_clear();

    let count = replies.len();
    for (i, (query, reply)) in queries.iter().zip(&replies).enumerate() {
        print!("{}", render_reply(query, reply, show_trace));
        if i < count - 1 {
            ui::print_separator();
        }
    }

    if replies.iter().any(|reply| reply.outcome.is_err()) {
        anyhow::bail!("One or more conversions failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FxError, ResolutionTrace};

    fn plain(text: &str) -> String {
        console::strip_ansi_codes(text).to_string()
    }

    #[test]
    fn test_render_no_intent_with_trace() {
        let mut trace = ResolutionTrace::new();
        trace.record("Parsing query: \"hi\"");
        trace.record("No currency pattern matched.");
        let reply = ToolReply {
            outcome: Ok(ToolOutcome::NoIntent),
            trace,
        };

        let output = plain(&render_reply("hi", &reply, true));
        assert!(output.starts_with("hi\n\n"));
        assert!(output.contains("No currency conversion found"));
        assert!(output.contains("Resolution trace:"));
        assert!(output.contains("  No currency pattern matched.\n"));
    }

    #[test]
    fn test_render_error_without_trace() {
        let reply = ToolReply {
            outcome: Err(FxError::UnsupportedCurrency("XYZ".to_string())),
            trace: ResolutionTrace::new(),
        };

        let output = plain(&render_reply("100 usd to xyz", &reply, false));
        assert!(output.contains("Error: Unsupported currency: XYZ"));
        assert!(!output.contains("Resolution trace:"));
    }
}
