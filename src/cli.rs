// src/cli.rs
//! Command line: run the server, confirm onboarding details, or chat from
//! the terminal

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app_log;
use crate::client::ApiClient;
use crate::core::ConfigManager;
use crate::logging::LogTarget;
use crate::session::ChatPage;
use crate::types::{JobCard, Sender, UserProfile};
use crate::utils::read_file_content;

#[derive(Parser)]
#[command(name = "jobchat")]
#[command(about = "Job search chat assistant backed by JSearch and Gemini")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of a running server, used by the client commands
    #[arg(long, env = "JOBCHAT_API_URL", default_value = "http://localhost:8000", global = true)]
    pub api_url: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API server
    Serve,
    /// Confirm onboarding details from a profile JSON file
    Onboard {
        #[arg(long)]
        profile: PathBuf,
    },
    /// Chat with the assistant in the terminal
    Chat {
        #[arg(long)]
        email: String,
    },
}

impl Command {
    pub fn log_target(&self) -> LogTarget {
        match self {
            Command::Serve => LogTarget::Server,
            Command::Onboard { .. } | Command::Chat { .. } => LogTarget::Client,
        }
    }
}

pub async fn run(cli: Cli, config: ConfigManager) -> Result<()> {
    match cli.command {
        Command::Serve => crate::start_web_server(config).await,
        Command::Onboard { profile } => onboard(&cli.api_url, &profile).await,
        Command::Chat { email } => chat(&cli.api_url, &email).await,
    }
}

async fn onboard(api_url: &str, path: &std::path::Path) -> Result<()> {
    let content = read_file_content(path).await?;
    let profile: UserProfile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid profile JSON in {}", path.display()))?;

    let client = ApiClient::new(api_url)?;
    let confirmation = client.confirm_onboarding(&profile).await?;
    app_log!(info, "{} ({})", confirmation.message, profile.email);
    println!("{}", confirmation.message);
    Ok(())
}

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    NewChat,
    ListChats,
    OpenChat(usize),
    DeleteChat(usize),
    Jobs,
    NextPage,
    PrevPage,
    Show(usize),
    Close,
    Save(usize),
    Apply(usize),
    /// Job on the current page, or the one in the open modal
    Ask(Option<usize>),
    Help,
    Quit,
    Message(String),
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if !line.starts_with('/') {
            return ReplCommand::Message(line.to_string());
        }

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let argument = parts.next();
        let index = argument.and_then(|a| a.parse::<usize>().ok()).filter(|n| *n > 0);

        let indexed = |build: fn(usize) -> ReplCommand| match index {
            Some(n) => build(n),
            None => ReplCommand::Invalid(format!("{} needs a number, e.g. {} 1", command, command)),
        };

        match command {
            "/new" => ReplCommand::NewChat,
            "/chats" => ReplCommand::ListChats,
            "/open" => indexed(ReplCommand::OpenChat),
            "/delete" => indexed(ReplCommand::DeleteChat),
            "/jobs" => ReplCommand::Jobs,
            "/next" => ReplCommand::NextPage,
            "/prev" => ReplCommand::PrevPage,
            "/show" => indexed(ReplCommand::Show),
            "/close" => ReplCommand::Close,
            "/save" => indexed(ReplCommand::Save),
            "/apply" => indexed(ReplCommand::Apply),
            "/ask" if argument.is_none() => ReplCommand::Ask(None),
            "/ask" => indexed(|n| ReplCommand::Ask(Some(n))),
            "/help" => ReplCommand::Help,
            "/quit" | "/exit" => ReplCommand::Quit,
            other => ReplCommand::Invalid(format!("Unknown command {}, try /help", other)),
        }
    }
}

const HELP: &str = "\
/new              start a new chat
/chats            list chats
/open N           open chat N
/delete N         delete chat N
/jobs             show the current page of jobs
/next, /prev      change page
/show N           job details
/close            close job details
/save N           save or unsave job N
/apply N          open the apply link and confirm
/ask [N]          ask about job N (or the one shown) in the next message
/quit             leave
Anything else is sent to the assistant.";

async fn chat(api_url: &str, email: &str) -> Result<()> {
    let client = ApiClient::new(api_url)?;
    let mut page = ChatPage::new(email);
    page.load(&client).await?;

    if page.chats().is_empty() {
        page.new_chat(&client).await?;
    } else if let Some(latest) = page.chats().first().map(|c| c.chat_id.clone()) {
        page.open_chat(&client, &latest).await?;
    }
    print_conversation(&page);
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match ReplCommand::parse(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Invalid(message) => println!("{}", message),
            ReplCommand::Message(text) if text.is_empty() => {}
            ReplCommand::Message(text) => {
                println!("...");
                match page.send(&client, &text).await {
                    Ok(()) => print_last_reply(&page),
                    Err(e) => println!("! {}", e),
                }
            }
            ReplCommand::NewChat => {
                report(page.new_chat(&client).await);
                print_conversation(&page);
            }
            ReplCommand::ListChats => print_chats(&page),
            ReplCommand::OpenChat(n) => match page.chats().get(n - 1).map(|c| c.chat_id.clone()) {
                Some(chat_id) => {
                    report(page.open_chat(&client, &chat_id).await);
                    print_conversation(&page);
                }
                None => println!("No chat {}", n),
            },
            ReplCommand::DeleteChat(n) => match page.chats().get(n - 1).map(|c| c.chat_id.clone()) {
                Some(chat_id) => {
                    report(page.delete_chat(&client, &chat_id).await);
                    print_chats(&page);
                }
                None => println!("No chat {}", n),
            },
            ReplCommand::Jobs => print_jobs(&page),
            ReplCommand::NextPage => {
                page.board.next_page();
                print_jobs(&page);
            }
            ReplCommand::PrevPage => {
                page.board.prev_page();
                print_jobs(&page);
            }
            ReplCommand::Show(n) => match page.board.visible_card(n).cloned() {
                Some(job) => {
                    print_job_details(&job);
                    page.modal.open(job);
                }
                None => println!("No job {} on this page", n),
            },
            ReplCommand::Close => page.modal.close(),
            ReplCommand::Save(n) => match page.board.visible_card(n).cloned() {
                Some(job) => match page.board.toggle_save(&client, email, &job).await {
                    Ok(true) => println!("Saved {}", job.job_title),
                    Ok(false) => println!("Removed {} from saved jobs", job.job_title),
                    Err(e) => println!("! {}", e),
                },
                None => println!("No job {} on this page", n),
            },
            ReplCommand::Apply(n) => match page.board.visible_card(n).cloned() {
                Some(job) => apply(&mut page, &client, email, &job, &mut lines).await?,
                None => println!("No job {} on this page", n),
            },
            ReplCommand::Ask(n) => {
                if let Some(job) = n.and_then(|n| page.board.visible_card(n).cloned()) {
                    page.modal.open(job);
                }
                match page.modal.ask_about() {
                    Some(job_id) => {
                        page.select_job_for_next_message(job_id);
                        println!("Your next message will be about this job.");
                    }
                    None => println!("Pick a job first: /ask N or /show N"),
                }
            }
        }
    }

    Ok(())
}

async fn apply<R>(
    page: &mut ChatPage,
    client: &ApiClient,
    email: &str,
    job: &JobCard,
    lines: &mut tokio::io::Lines<R>,
) -> Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let link = match page.board.begin_apply(job) {
        Ok(link) => link,
        Err(e) => {
            println!("! {}", e);
            return Ok(());
        }
    };

    println!("Apply here: {}", link);
    println!("Did you apply to {} at {}? [y/N]", job.job_title, job.employer_name);

    let answer = lines.next_line().await?.unwrap_or_default();
    if answer.trim().eq_ignore_ascii_case("y") {
        match page.board.confirm_apply(client, email).await {
            Ok(()) => println!("Marked as applied."),
            Err(e) => println!("! {}", e),
        }
    } else {
        page.board.cancel_apply();
    }
    Ok(())
}

fn report<T>(result: crate::session::SessionResult<T>) {
    if let Err(e) = result {
        println!("! {}", e);
    }
}

fn speaker(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "you",
        Sender::Bot => "assistant",
    }
}

fn print_conversation(page: &ChatPage) {
    let Some(active) = page.active() else {
        println!("No chat open. /new starts one.");
        return;
    };
    println!("== {} ==", active.chat_name);
    for entry in &active.entries {
        println!("{}> {}", speaker(entry.sender), entry.message);
    }
    if !page.board.cards().is_empty() {
        print_jobs(page);
    }
}

fn print_last_reply(page: &ChatPage) {
    if let Some(entry) = page.active().and_then(|a| a.entries.last()) {
        println!("{}> {}", speaker(entry.sender), entry.message);
        if entry.jobs.as_ref().is_some_and(|j| !j.is_empty()) {
            print_jobs(page);
        }
    }
}

fn print_chats(page: &ChatPage) {
    if page.chats().is_empty() {
        println!("No chats yet.");
    }
    let active_id = page.active().map(|a| a.chat_id.as_str());
    for (i, chat) in page.chats().iter().enumerate() {
        let marker = if Some(chat.chat_id.as_str()) == active_id { "*" } else { " " };
        println!("{}{:>2}. {}", marker, i + 1, chat.chat_name);
    }
}

fn print_jobs(page: &ChatPage) {
    let board = &page.board;
    println!("-- {} --", board.range_label());
    for (i, job) in board.visible().iter().enumerate() {
        let mut flags = Vec::new();
        if board.is_saved(&job.job_id) {
            flags.push("saved");
        }
        if board.is_applied(&job.job_id) {
            flags.push("applied");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "{:>2}. {} - {} ({}){}",
            i + 1,
            job.job_title,
            job.employer_name,
            job.job_location,
            flags
        );
    }
    if board.page_count() > 1 {
        println!("page {}/{}", board.page() + 1, board.page_count());
    }
}

fn print_job_details(job: &JobCard) {
    println!("== {} ==", job.job_title);
    println!("{} | {}", job.employer_name, job.job_location);
    if let Some(salary) = &job.job_salary {
        println!("Salary: {}", salary);
    }
    if !job.job_employment_type.is_empty() {
        println!("Type: {}", job.job_employment_type);
    }
    if let Some(highlights) = &job.job_highlights {
        for (section, items) in highlights {
            println!("{}:", section);
            for item in items {
                println!("  - {}", item);
            }
        }
    }
    if !job.job_description.is_empty() {
        println!("{}", job.job_description);
    }
    println!("Apply: {}", job.job_apply_link);
}
