//! `nlq ask` - interactive client for a running server.
//!
//! Type a question to run it; `next` fetches the following page of the last
//! question; `exit` quits.

use nlq_core::Row;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Body of a `POST /query` reply, success or failure.
#[derive(Debug, Default, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub generated_sql: Option<String>,
    #[serde(default)]
    pub data: Vec<Row>,
    #[serde(default)]
    pub next_offset: Option<u64>,
}

/// What to do with one line of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Exit,
    /// Nothing to send; print the message if any.
    Skip(Option<&'static str>),
    Send { prompt: String, offset: u64 },
}

/// Paging state between questions.
#[derive(Debug, Default)]
pub struct AskSession {
    last_prompt: Option<String>,
    offset: u64,
}

impl AskSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_hint(&self) -> &'static str {
        if self.last_prompt.is_some() {
            "Type 'next' for the next page, 'exit' to quit, or ask a new question: "
        } else {
            "Ask a question ('exit' to quit): "
        }
    }

    pub fn plan(&mut self, line: &str) -> Step {
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") {
            return Step::Exit;
        }
        if line.eq_ignore_ascii_case("next") {
            return match &self.last_prompt {
                Some(prompt) => Step::Send {
                    prompt: prompt.clone(),
                    offset: self.offset,
                },
                None => Step::Skip(Some("No query to page through. Ask a new question first.")),
            };
        }
        if line.is_empty() {
            return Step::Skip(None);
        }

        self.last_prompt = Some(line.to_string());
        self.offset = 0;
        Step::Send {
            prompt: line.to_string(),
            offset: 0,
        }
    }

    /// Update paging state from a reply. Errors and last pages end paging.
    pub fn record(&mut self, reply: &Reply) {
        match (&reply.error, reply.next_offset) {
            (None, Some(next)) => self.offset = next,
            _ => {
                self.last_prompt = None;
                self.offset = 0;
            }
        }
    }
}

pub async fn run(server: &str, page_size: u32) -> anyhow::Result<()> {
    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let url = format!("{}/query", server.trim_end_matches('/'));

    println!("nlq interactive client");
    println!("Server: {}", server);

    let mut session = AskSession::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(session.input_hint().as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let (prompt, offset) = match session.plan(&line) {
            Step::Exit => break,
            Step::Skip(message) => {
                if let Some(message) = message {
                    println!("{}", message);
                }
                continue;
            }
            Step::Send { prompt, offset } => (prompt, offset),
        };

        let reply = send(&client, &url, &prompt, page_size, offset).await;
        print_reply(&reply);
        session.record(&reply);
    }

    Ok(())
}

async fn send(client: &reqwest::Client, url: &str, prompt: &str, page_size: u32, offset: u64) -> Reply {
    let body = json!({ "prompt": prompt, "page_size": page_size, "offset": offset });

    let response = match client.post(url).json(&body).send().await {
        Ok(response) => response,
        Err(e) => {
            return Reply {
                error: Some(format!("Failed to reach the server: {}", e)),
                ..Default::default()
            };
        }
    };

    let status = response.status();
    match response.json::<Reply>().await {
        Ok(reply) => reply,
        Err(e) => Reply {
            error: Some(format!("Unexpected response (HTTP {}): {}", status, e)),
            ..Default::default()
        },
    }
}

fn print_reply(reply: &Reply) {
    if let Some(error) = &reply.error {
        println!("Error: {}", error);
        if let Some(sql) = &reply.generated_sql {
            println!("Generated SQL:\n{}", sql);
        }
        return;
    }

    println!("\nGenerated SQL:\n{}\n", reply.generated_sql.as_deref().unwrap_or_default());

    if reply.data.is_empty() {
        println!("The query succeeded but returned no rows.");
    } else {
        print!("{}", render_table(&reply.data));
        println!("{} row(s) returned.", reply.data.len());
    }

    if reply.next_offset.is_some() {
        println!("More rows available: type 'next' for the next page.\n");
    } else {
        println!("This is the last page.\n");
    }
}

/// Render rows as a column-aligned text table. Columns follow the first row.
pub fn render_table(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let headers: Vec<&String> = first.keys().collect();

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| headers.iter().map(|h| cell_text(row.get(h.as_str()))).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };
    let rule = format!(
        "+{}+\n",
        widths.iter().map(|w| "-".repeat(w + 2)).collect::<Vec<_>>().join("+")
    );

    let mut out = String::new();
    out.push_str(&rule);
    out.push_str(&line(headers.iter().map(|h| h.as_str()).collect()));
    out.push_str(&rule);
    for row in &cells {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out.push_str(&rule);
    out
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "NULL".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
