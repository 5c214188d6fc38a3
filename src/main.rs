use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use samproai::{
    catalog::{sign_with_date, InputShape},
    App, AppEvent, EventSink, GeminiClient, NullAdPlayer, ServiceKind, Store, PUBLIC_FEED_URL,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let data_dir = Store::default_dir().context("could not determine a data directory")?;
    let api_key = std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("API_KEY"))
        .unwrap_or_default();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let events: EventSink = Arc::new(move |ev| {
        let _ = tx.send(ev);
    });

    let app = App::open(
        data_dir,
        Arc::new(GeminiClient::new(api_key)),
        Arc::new(NullAdPlayer),
        events,
    )?;

    app.refresh_shared_content(PUBLIC_FEED_URL).await;
    info!(site = %app.config().site_name, "ready");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!();
        for (i, kind) in ServiceKind::all().enumerate() {
            println!("{:>2}. {}", i + 1, kind.config().title);
        }
        print!("> ");
        io::stdout().flush()?;

        let Some(choice) = lines.next().transpose()? else {
            break;
        };
        let Some(kind) = choice
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| ServiceKind::ALL.get(n.wrapping_sub(1)).copied())
        else {
            continue;
        };

        let Some(raw) = read_input(kind, &mut lines)? else {
            continue;
        };
        app.submit(kind, &raw)?;

        // Drain events until this request resolves.
        while let Some(ev) = rx.recv().await {
            match ev {
                AppEvent::SubscriptionPrompt => {
                    println!("{}", samproai::messages::SUBSCRIPTION_PROMPT);
                    print!("[اضغط Enter للاشتراك والمتابعة] ");
                    io::stdout().flush()?;
                    let _ = lines.next();
                    app.subscribe()?;
                }
                AppEvent::AdStarted { url, seconds } => {
                    println!("إعلان قصير ({seconds} ثانية): {url}");
                    app.ad_ready();
                }
                AppEvent::AdTick { remaining } => {
                    print!("\r{remaining:>3} ");
                    io::stdout().flush()?;
                }
                AppEvent::OpenExternal { url } => {
                    println!("↗ {url}");
                }
                AppEvent::NotifyTone => {
                    print!("\x07");
                }
                AppEvent::GenerationFinished { service, .. } => {
                    println!();
                    if let Some(text) = app.result(service) {
                        println!("{text}");
                    }
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Collect the raw input for a service the way its form shape dictates.
/// Returns None when the user gives up.
fn read_input(
    kind: ServiceKind,
    lines: &mut io::Lines<io::StdinLock<'_>>,
) -> Result<Option<String>> {
    let config = kind.config();
    println!("{} — {}", config.title, config.placeholder);

    match config.input {
        InputShape::Select { options } => {
            for (i, option) in options.iter().enumerate() {
                println!("{:>2}. {option}", i + 1);
            }
            print!("> ");
            io::stdout().flush()?;
            let Some(line) = lines.next().transpose()? else {
                return Ok(None);
            };
            let Some(choice) = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| options.get(n.wrapping_sub(1)))
            else {
                return Ok(None);
            };

            if kind == ServiceKind::Horoscope {
                print!("التاريخ (YYYY-MM-DD): ");
                io::stdout().flush()?;
                let Some(date) = lines.next().transpose()? else {
                    return Ok(None);
                };
                return Ok(Some(sign_with_date(choice, date.trim())));
            }
            Ok(Some(choice.to_string()))
        }
        InputShape::Text => {
            print!("> ");
            io::stdout().flush()?;
            let line = lines.next().transpose()?;
            Ok(line.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()))
        }
        InputShape::Multiline => {
            // Terminated by an empty line.
            let mut buf = Vec::new();
            loop {
                let Some(line) = lines.next().transpose()? else {
                    break;
                };
                if line.trim().is_empty() {
                    break;
                }
                buf.push(line);
            }
            if buf.is_empty() {
                Ok(None)
            } else {
                Ok(Some(buf.join("\n")))
            }
        }
    }
}
