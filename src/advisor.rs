// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! AI advisor boundary. Every call degrades to fixed text instead of failing.

use crate::models::{Insight, Severity, Transaction};
use crate::tasks::Publisher;
use anyhow::{Context, Result, anyhow};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub const INSIGHT_WINDOW: usize = 15;
pub const CHAT_CONTEXT_WINDOW: usize = 5;

pub const CHAT_EMPTY_REPLY: &str = "Sorry, I couldn't process that request.";
pub const CHAT_FAILURE_REPLY: &str = "Sorry, the financial advisor is unavailable right now.";

const INSIGHTS_SYSTEM: &str = "You are an experienced financial advisor. Be brief, professional and positive.";
const CHAT_SYSTEM: &str = "You are a helpful finance assistant inside the CoinKeep app. Answer briefly, based on the provided context.";

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub system: String,
    pub prompt: String,
    /// Ask for a JSON array of insights instead of free text.
    pub json_insights: bool,
}

/// A text-generation backend.
pub trait LanguageModel: Send + Sync {
    fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

pub struct GeminiClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(endpoint: &str, model: &str, api_key: Option<String>) -> Result<Self> {
        Ok(GeminiClient {
            client: crate::utils::http_client()?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl LanguageModel for GeminiClient {
    fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow!("no API key configured"))?;
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let mut body = json!({
            "systemInstruction": { "parts": [{ "text": request.system }] },
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
        });
        if request.json_insights {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "title": { "type": "STRING" },
                            "description": { "type": "STRING" },
                            "type": { "type": "STRING", "enum": ["warning", "success", "info"] }
                        },
                        "required": ["title", "description", "type"]
                    }
                }
            });
        }
        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()?
            .error_for_status()?;
        let parsed: GenerateResponse = resp.json().context("Decode model response")?;
        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");
        Ok(text)
    }
}

pub fn welcome_insights() -> Vec<Insight> {
    vec![
        Insight {
            title: "Welcome to CoinKeep!".into(),
            description: "Start adding your income and expenses to get personal tips from the AI."
                .into(),
            severity: Severity::Info,
        },
        Insight {
            title: "Tip".into(),
            description:
                "Add recurring payments as subscriptions to keep track of monthly charges.".into(),
            severity: Severity::Success,
        },
    ]
}

pub fn unavailable_insights() -> Vec<Insight> {
    vec![Insight {
        title: "Analysis unavailable".into(),
        description: "Could not generate tips. Please check the API key.".into(),
        severity: Severity::Info,
    }]
}

/// Balance plus the few newest transactions; never the whole ledger.
pub fn context_summary(total_balance: Decimal, currency: &str, transactions: &[Transaction]) -> String {
    let window = &transactions[..CHAT_CONTEXT_WINDOW.min(transactions.len())];
    let recent = serde_json::to_string(window).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Balance: {} {}. Recent transactions: {}",
        total_balance, currency, recent
    )
}

pub struct Advisor<M: LanguageModel> {
    model: M,
}

impl<M: LanguageModel> Advisor<M> {
    pub fn new(model: M) -> Self {
        Advisor { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// `transactions` is expected newest first. An empty ledger gets the
    /// welcome set without contacting the model.
    pub fn generate_insights(
        &self,
        transactions: &[Transaction],
        total_balance: Decimal,
        currency: &str,
    ) -> Vec<Insight> {
        if transactions.is_empty() {
            return welcome_insights();
        }
        match self.try_insights(transactions, total_balance, currency) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "insight generation failed");
                unavailable_insights()
            }
        }
    }

    fn try_insights(
        &self,
        transactions: &[Transaction],
        total_balance: Decimal,
        currency: &str,
    ) -> Result<Vec<Insight>> {
        let window = &transactions[..INSIGHT_WINDOW.min(transactions.len())];
        let prompt = format!(
            "Analyse the following financial data and give 3 concrete, useful tips or observations. \
             Focus on spending habits, saving opportunities or anomalies.\n\n\
             Current balance: {} {}\n\
             Recent transactions: {}",
            total_balance,
            currency,
            serde_json::to_string(window)?
        );
        let text = self.model.generate(&GenerateRequest {
            system: INSIGHTS_SYSTEM.to_string(),
            prompt,
            json_insights: true,
        })?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let insights: Vec<Insight> =
            serde_json::from_str(text.trim()).context("Model returned malformed insights")?;
        Ok(insights)
    }

    pub fn chat(&self, message: &str, context: &str) -> String {
        let req = GenerateRequest {
            system: CHAT_SYSTEM.to_string(),
            prompt: format!("User data context: {}\n\nUser question: {}", context, message),
            json_insights: false,
        };
        match self.model.generate(&req) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => CHAT_EMPTY_REPLY.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "advisor chat failed");
                CHAT_FAILURE_REPLY.to_string()
            }
        }
    }
}

/// Runs insight generation on a background thread and hands the result to
/// `publisher`. The task gets copies of the data, never the ledger itself.
pub fn spawn_insights<M: LanguageModel + 'static>(
    advisor: Arc<Advisor<M>>,
    publisher: Publisher<Vec<Insight>>,
    transactions: Vec<Transaction>,
    total_balance: Decimal,
    currency: String,
) {
    std::thread::spawn(move || {
        let insights = advisor.generate_insights(&transactions, total_balance, &currency);
        publisher.publish(insights);
    });
}

pub fn spawn_chat<M: LanguageModel + 'static>(
    advisor: Arc<Advisor<M>>,
    publisher: Publisher<String>,
    message: String,
    context: String,
) {
    std::thread::spawn(move || {
        let reply = advisor.chat(&message, &context);
        publisher.publish(reply);
    });
}
