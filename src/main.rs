//! Terminal front-end for qbot
//!
//! Every line typed on stdin is a chat message from one local player in a
//! single channel; cards the bot posts are printed as they arrive.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use qbot::{
    channel::{
        AuthorId, Card, Channel, ChannelId, Message, Tone,
        local::{LocalChannel, Outgoing},
    },
    command::Bot,
    config::Settings,
    qbreader::QbReader,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// The local player
const PLAYER: AuthorId = AuthorId(1);

/// Quiz bowl tossups and bonuses in the terminal
#[derive(Parser, Debug)]
#[command(name = "qbot", version, about)]
struct Cli {
    /// Settings file (defaults to ./qbot.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn print_card(card: &Card, edited: bool) {
    let title = match card.tone {
        Tone::Neutral => card.title.cyan(),
        Tone::Success => card.title.green(),
        Tone::Failure => card.title.red(),
    }
    .bold();
    if edited {
        println!("{} {title}", "~".dimmed());
    } else {
        println!("{title}");
    }
    if let Some(description) = card.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {description}");
    }
    for (name, value) in &card.fields {
        println!("  {} {value}", format!("{name}:").dimmed());
    }
    if let Some(footer) = &card.footer {
        println!("  {}", footer.dimmed().italic());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    info!(?settings, "starting qbot");

    let api = QbReader::new(settings.api_base.clone());
    let prefix = settings.prefix.clone();
    let bot = Arc::new(Bot::new(api.clone(), api, settings));

    let (channel, mut outgoing) = LocalChannel::new(ChannelId(0));
    tokio::spawn(async move {
        while let Some(event) = outgoing.recv().await {
            match &event {
                Outgoing::Sent(_, card) => print_card(card, false),
                Outgoing::Edited(_, card) => print_card(card, true),
            }
        }
    });

    println!(
        "{} type {prefix}tossup, {prefix}tk, {prefix}bonus or {prefix}pk, \
         optionally followed by categories and difficulties; {prefix}end stops",
        "qbot".bold()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            result = tokio::signal::ctrl_c() => {
                result.context("listening for ctrl-c")?;
                None
            }
        };
        let Some(content) = line else {
            break;
        };

        let message = Message {
            author: PLAYER,
            content,
        };
        channel.post(message.author, message.content.clone());

        let bot = Arc::clone(&bot);
        let channel = channel.clone();
        tokio::spawn(async move {
            if let Err(error) = bot.handle(&channel, &message).await {
                warn!(%error, channel = %channel.id(), "play failed");
            }
        });
    }

    info!("bye");
    Ok(())
}
