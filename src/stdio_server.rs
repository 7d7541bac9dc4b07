use anyhow::Result;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

use crate::{
    catalog::Catalog,
    consultation::booking_calendar,
    doctors::{DoctorDirectory, DoctorQuery, DoctorSort},
    history::{filter_by_source, HistoryRepository, SourceType},
    session::SessionProvider,
    subscription::{price_list, Currency, Plan},
    MediSafeEngine,
};

pub fn run(engine: &MediSafeEngine) -> Result<()> {
    info!(instance = %engine.instance_id(), "stdio server started");
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(engine, stdin.lock(), &mut stdout.lock())
}

/// Line-delimited JSON-RPC over any reader/writer pair.
pub fn serve(engine: &MediSafeEngine, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    let doctors = DoctorDirectory::builtin();

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let msg: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                write_error(out, &Value::Null, -32700, &format!("parse error: {e}"))?;
                continue;
            }
        };

        let id = msg.get("id").cloned().unwrap_or(Value::Null);
        let method = msg["method"].as_str().unwrap_or("");
        let params = msg.get("params").cloned().unwrap_or(Value::Null);

        if method.starts_with("notifications/") {
            continue;
        }

        debug!(method, "request");
        match dispatch(engine, &doctors, method, &params) {
            Ok(payload) => write_ok(out, &id, payload)?,
            Err(e) => write_error(out, &id, -32603, &e.to_string())?,
        }
    }
    Ok(())
}

fn dispatch(
    engine: &MediSafeEngine,
    doctors: &DoctorDirectory,
    method: &str,
    params: &Value,
) -> Result<Value> {
    match method {
        "initialize" => Ok(handle_initialize()),
        "tools/list" => Ok(handle_tools_list()),
        "tools/call" => handle_tool_call(engine, doctors, params),
        other => anyhow::bail!("unknown method: {other}"),
    }
}

fn handle_initialize() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": { "name": "MediSafe", "version": env!("CARGO_PKG_VERSION") }
    })
}

fn handle_tools_list() -> Value {
    json!({
        "tools": [
            {
                "name": "medisafe_search",
                "description": "Rank catalog medicines for a free-text name. Falls back to a single generated record when nothing matches.",
                "inputSchema": {
                    "type": "object",
                    "properties": { "query": { "type": "string", "description": "Brand, generic or alias name" } },
                    "required": ["query"]
                }
            },
            {
                "name": "medisafe_select",
                "description": "Rank a query and record one of the results in the current user's history.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "query":  { "type": "string" },
                        "pick":   { "type": "integer", "description": "Zero-based result index (default 0)" },
                        "source": { "type": "string", "description": "One of: camera, search, upload (default search)" }
                    },
                    "required": ["query"]
                }
            },
            {
                "name": "medisafe_analysis",
                "description": "Safety analysis (organ risks, alternatives, traditional remedies) for one of the results last shown for a query.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "query": { "type": "string" },
                        "pick":  { "type": "integer", "description": "Zero-based result index (default 0)" }
                    },
                    "required": ["query"]
                }
            },
            {
                "name": "medisafe_popular",
                "description": "Suggested searches for an empty search box.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "medisafe_history",
                "description": "List the current user's history, newest first, optionally filtered by source.",
                "inputSchema": {
                    "type": "object",
                    "properties": { "source": { "type": "string", "description": "camera, search or upload (omit for all)" } }
                }
            },
            {
                "name": "medisafe_doctors",
                "description": "Search the consultation doctor directory.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "text":           { "type": "string" },
                        "specialization": { "type": "string" },
                        "sort":           { "type": "string", "description": "rating, experience, consultations or fee" }
                    }
                }
            },
            {
                "name": "medisafe_booking_options",
                "description": "Specializations, bookable dates (next seven days) and time slots for a consultation.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "medisafe_plans",
                "description": "Paid subscription plans with prices in the chosen currency.",
                "inputSchema": {
                    "type": "object",
                    "properties": { "currency": { "type": "string", "description": "usd (default) or inr" } }
                }
            },
            {
                "name": "medisafe_subscribe",
                "description": "Activate a paid plan for the signed-in user. No payment is taken.",
                "inputSchema": {
                    "type": "object",
                    "properties": { "plan": { "type": "string", "description": "monthly or yearly" } },
                    "required": ["plan"]
                }
            }
        ]
    })
}

fn handle_tool_call(
    engine: &MediSafeEngine,
    doctors: &DoctorDirectory,
    params: &Value,
) -> Result<Value> {
    let name = params["name"].as_str().unwrap_or("");
    let args = &params["arguments"];

    let text = match name {
        "medisafe_search" => {
            let query = args["query"].as_str().unwrap_or("");
            anyhow::ensure!(!query.trim().is_empty(), "medisafe_search requires 'query'");
            serde_json::to_string_pretty(&engine.search(query))?
        }
        "medisafe_select" => {
            let query = args["query"].as_str().unwrap_or("");
            anyhow::ensure!(!query.trim().is_empty(), "medisafe_select requires 'query'");
            let pick = args["pick"].as_u64().unwrap_or(0) as usize;
            let source = parse_source(args["source"].as_str())?.unwrap_or(SourceType::Search);
            let Some(entry) = engine.select(query, pick, source)? else {
                anyhow::bail!("no result at position {pick} for '{query}'");
            };
            serde_json::to_string_pretty(&entry)?
        }
        "medisafe_analysis" => {
            let query = args["query"].as_str().unwrap_or("");
            anyhow::ensure!(!query.trim().is_empty(), "medisafe_analysis requires 'query'");
            let pick = args["pick"].as_u64().unwrap_or(0) as usize;
            let Some(analysis) = engine.analyze(query, pick) else {
                anyhow::bail!("no result at position {pick} for '{query}'");
            };
            serde_json::to_string_pretty(&analysis)?
        }
        "medisafe_popular" => serde_json::to_string_pretty(Catalog::popular_searches())?,
        "medisafe_history" => {
            let source = parse_source(args["source"].as_str())?;
            let user_id = engine.session().history_user_id()?;
            let entries = filter_by_source(engine.history().list(&user_id)?, source);
            serde_json::to_string_pretty(&entries)?
        }
        "medisafe_doctors" => {
            let sort = match args["sort"].as_str() {
                Some(s) => DoctorSort::parse_str(s)
                    .ok_or_else(|| anyhow::anyhow!("unknown sort: {s}"))?,
                None => DoctorSort::default(),
            };
            let query = DoctorQuery {
                text: args["text"].as_str().unwrap_or("").to_string(),
                specialization: args["specialization"].as_str().map(str::to_string),
                sort,
            };
            serde_json::to_string_pretty(&doctors.find(&query))?
        }
        "medisafe_booking_options" => {
            let calendar = booking_calendar(chrono::Local::now().date_naive());
            serde_json::to_string_pretty(&json!({
                "specializations": doctors.specializations(),
                "dates": calendar.dates,
                "timeSlots": calendar.time_slots,
            }))?
        }
        "medisafe_plans" => {
            let currency = match args["currency"].as_str() {
                Some(c) => Currency::parse_str(c)
                    .ok_or_else(|| anyhow::anyhow!("unknown currency: {c}"))?,
                None => Currency::default(),
            };
            let plans = price_list(currency);
            serde_json::to_string_pretty(&plans)?
        }
        "medisafe_subscribe" => {
            let raw = args["plan"].as_str().unwrap_or("");
            let plan = Plan::parse_str(raw)
                .ok_or_else(|| anyhow::anyhow!("medisafe_subscribe requires 'plan'"))?;
            let Some(user) = engine.session().subscribe(plan)? else {
                anyhow::bail!("sign in first; only monthly and yearly plans can be bought");
            };
            serde_json::to_string_pretty(&user)?
        }
        other => anyhow::bail!("unknown tool: {other}"),
    };

    Ok(json!({ "content": [{ "type": "text", "text": text }] }))
}

fn parse_source(raw: Option<&str>) -> Result<Option<SourceType>> {
    match raw {
        None => Ok(None),
        Some(s) => SourceType::parse_str(s)
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("unknown source: {s}")),
    }
}

fn write_ok(out: &mut impl Write, id: &Value, result: Value) -> Result<()> {
    let envelope = json!({ "jsonrpc": "2.0", "id": id, "result": result });
    writeln!(out, "{}", serde_json::to_string(&envelope)?)?;
    out.flush()?;
    Ok(())
}

fn write_error(out: &mut impl Write, id: &Value, code: i32, message: &str) -> Result<()> {
    let envelope = json!({
        "jsonrpc": "2.0", "id": id,
        "error": { "code": code, "message": message }
    });
    writeln!(out, "{}", serde_json::to_string(&envelope)?)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(engine: &MediSafeEngine, requests: &[&str]) -> Vec<Value> {
        let input = requests.join("\n");
        let mut out = Vec::new();
        serve(engine, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn tool_text(reply: &Value) -> Value {
        let text = reply["result"]["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn lists_every_tool() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let replies = exchange(&engine, &[r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#]);
        let tools = replies[0]["result"]["tools"].as_array().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec![
                "medisafe_search",
                "medisafe_select",
                "medisafe_analysis",
                "medisafe_popular",
                "medisafe_history",
                "medisafe_doctors",
                "medisafe_booking_options",
                "medisafe_plans",
                "medisafe_subscribe"
            ]
        );
    }

    #[test]
    fn fallback_shown_by_search_is_the_one_selected_and_analyzed() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let replies = exchange(
            &engine,
            &[
                r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"medisafe_search","arguments":{"query":"zzqx"}}}"#,
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"medisafe_select","arguments":{"query":"zzqx"}}}"#,
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"medisafe_analysis","arguments":{"query":"zzqx"}}}"#,
            ],
        );
        let shown = tool_text(&replies[0])["results"][0].clone();
        assert_eq!(tool_text(&replies[1])["medicine"], shown);
        let analysis = tool_text(&replies[2]);
        assert_eq!(analysis["medicine"], shown);
        assert_eq!(analysis["alternatives"][0]["name"], "Natural Alternative");
    }

    #[test]
    fn plans_priced_in_rupees_and_subscription_needs_sign_in() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let replies = exchange(
            &engine,
            &[
                r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"medisafe_plans","arguments":{"currency":"inr"}}}"#,
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"medisafe_subscribe","arguments":{"plan":"yearly"}}}"#,
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"medisafe_popular","arguments":{}}}"#,
            ],
        );
        let plans = tool_text(&replies[0]);
        assert_eq!(plans[0]["price"], "₹4,999");
        assert_eq!(plans[1]["savings"], "₹25,989");
        assert_eq!(replies[1]["error"]["code"], -32603);
        assert_eq!(tool_text(&replies[2])[0], "Paracetamol");

        engine.session().login("asha@example.com", "secret1").unwrap();
        let replies = exchange(
            &engine,
            &[r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"medisafe_subscribe","arguments":{"plan":"yearly"}}}"#],
        );
        let user = tool_text(&replies[0]);
        assert_eq!(user["subscription"]["status"], "active");
        assert_eq!(user["subscription"]["consultationsLimit"], 60);
    }

    #[test]
    fn parse_errors_and_notifications() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let replies = exchange(
            &engine,
            &[
                "{not json",
                r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
                "",
                r#"{"jsonrpc":"2.0","id":7,"method":"bogus"}"#,
            ],
        );
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["error"]["code"], -32700);
        assert_eq!(replies[0]["id"], Value::Null);
        assert_eq!(replies[1]["error"]["code"], -32603);
        assert_eq!(replies[1]["id"], 7);
    }

    #[test]
    fn search_tool_returns_ranked_outcome() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let replies = exchange(
            &engine,
            &[r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"medisafe_search","arguments":{"query":"omez"}}}"#],
        );
        let outcome = tool_text(&replies[0]);
        assert_eq!(outcome["results"][0]["name"], "Omeprazole");
        assert_eq!(outcome["synthetic"], false);
    }

    #[test]
    fn select_then_history() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let replies = exchange(
            &engine,
            &[
                r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"medisafe_select","arguments":{"query":"crocin","source":"camera"}}}"#,
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"medisafe_select","arguments":{"query":"omez"}}}"#,
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"medisafe_history","arguments":{"source":"camera"}}}"#,
                r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"medisafe_history","arguments":{}}}"#,
            ],
        );
        assert_eq!(tool_text(&replies[0])["searchType"], "camera");
        let camera = tool_text(&replies[2]);
        assert_eq!(camera.as_array().unwrap().len(), 1);
        assert_eq!(camera[0]["medicine"]["name"], "Crocin");
        let all = tool_text(&replies[3]);
        assert_eq!(all[0]["medicine"]["name"], "Omeprazole");
        assert_eq!(all[1]["medicine"]["name"], "Crocin");
    }

    #[test]
    fn tool_argument_errors() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let replies = exchange(
            &engine,
            &[
                r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"medisafe_search","arguments":{"query":"  "}}}"#,
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"medisafe_history","arguments":{"source":"fax"}}}"#,
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"medisafe_select","arguments":{"query":"crocin","pick":9}}}"#,
            ],
        );
        for reply in &replies {
            assert_eq!(reply["error"]["code"], -32603);
        }
    }

    #[test]
    fn doctors_tool_sorts_by_fee() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let replies = exchange(
            &engine,
            &[r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"medisafe_doctors","arguments":{"sort":"fee"}}}"#],
        );
        let found = tool_text(&replies[0]);
        assert_eq!(found[0]["name"], "Dr. Anita Patel");
        assert_eq!(found[0]["consultationFee"], 450);
    }

    #[test]
    fn booking_options_cover_a_week_of_slots() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let replies = exchange(
            &engine,
            &[r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"medisafe_booking_options","arguments":{}}}"#],
        );
        let options = tool_text(&replies[0]);
        let specializations = options["specializations"].as_array().unwrap();
        assert!(!specializations.is_empty());
        assert!(specializations.iter().all(|s| s.is_string()));
        assert_eq!(options["dates"].as_array().unwrap().len(), 7);
        assert_eq!(options["timeSlots"][0], "09:00 AM");
    }
}
