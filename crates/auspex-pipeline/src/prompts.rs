use auspex_models::market::{Market, ResearchContext};
use auspex_models::signal::Signal;

pub const BATCH_SYSTEM_PROMPT: &str = "You are a JSON-only response bot for trading signal \
     analysis. Return ONLY valid JSON, no markdown fences, no explanation outside the JSON object.";

pub const RECONCILIATION_SYSTEM_PROMPT: &str = "You are a JSON-only response bot for signal \
     reconciliation. Return ONLY valid JSON, no markdown fences, no explanation outside the JSON \
     object.";

/// JSON shape a batch analysis reply must have.
fn batch_schema() -> String {
    let example = serde_json::json!({
        "signals": [
            {
                "market_id": "<market id from input>",
                "market_title": "<market title from input>",
                "prediction": "yes | no",
                "confidence": "low | medium | high",
                "rationale": "<one or two sentences grounded in the research>"
            }
        ]
    });
    serde_json::to_string_pretty(&example).unwrap_or_default()
}

/// JSON shape a reconciliation reply must have.
fn reconciliation_schema() -> String {
    let example = serde_json::json!({
        "signals": [
            {
                "market_id": "<market id>",
                "market_title": "<market title>",
                "prediction": "yes | no",
                "confidence": "low | medium | high",
                "rationale": "<adjusted rationale if changed, original otherwise>",
                "current_price": "<unchanged from input>"
            }
        ],
        "overall_analysis": "<two or three sentences on overall consistency>"
    });
    serde_json::to_string_pretty(&example).unwrap_or_default()
}

fn findings_block(findings: &[String]) -> String {
    if findings.is_empty() {
        "(none)".to_string()
    } else {
        findings
            .iter()
            .map(|finding| format!("- {finding}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Build the user prompt for one batch analysis call.
pub fn format_batch_prompt(ctx: &ResearchContext, markets: &[Market]) -> String {
    let markets_json = serde_json::to_string_pretty(markets).unwrap_or_default();
    format!(
        "Produce one trading signal for every market below, based strictly on the research \
         provided. Do not invent facts.\n\n\
         ## EVENT\n\n\
         {title}\n\
         {description}\n\n\
         ## RESEARCH SUMMARY\n\n\
         {summary}\n\n\
         ## KEY FINDINGS\n\n\
         {findings}\n\n\
         Research sentiment: {sentiment}\n\n\
         ## MARKETS\n\n\
         {markets_json}\n\n\
         Respond with ONLY a JSON object of this exact shape:\n\n\
         {schema}",
        title = ctx.main_event.title,
        description = ctx.main_event.description.as_deref().unwrap_or(""),
        summary = ctx.research_summary,
        findings = findings_block(&ctx.key_findings),
        sentiment = ctx.sentiment,
        schema = batch_schema(),
    )
}

/// Build the user prompt for the cross-batch reconciliation call.
pub fn format_reconciliation_prompt(ctx: &ResearchContext, signals: &[Signal]) -> String {
    let signals_json = serde_json::to_string_pretty(signals).unwrap_or_default();
    format!(
        "The signals below were produced by independent batch analyses of markets under one \
         event. Review them together for logical consistency and adjust individual signals where \
         needed.\n\n\
         ## EVENT\n\n\
         {title}\n\
         {description}\n\n\
         Research sentiment: {sentiment}\n\n\
         ## CONSISTENCY RULES\n\n\
         - Markets that differ only by a cumulative date cutoff (\"by March\", \"by June\", \
         \"by year-end\") must imply a monotonically non-decreasing likelihood as the cutoff \
         widens.\n\
         - Mutually exclusive outcomes must not all carry strong YES signals.\n\
         - Keep every market_id from the input; do not add or drop markets.\n\n\
         ## SIGNALS\n\n\
         {signals_json}\n\n\
         Respond with ONLY a JSON object of this exact shape:\n\n\
         {schema}",
        title = ctx.main_event.title,
        description = ctx.main_event.description.as_deref().unwrap_or(""),
        sentiment = ctx.sentiment,
        schema = reconciliation_schema(),
    )
}
