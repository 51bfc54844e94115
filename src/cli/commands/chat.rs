//! Interactive chat command.

use crate::agent::{AgentOutput, AgentSession};
use crate::assistant::create_agent;
use crate::cli::preflight::{self, Operation};
use crate::cli::repl::{run_loop, LoopOptions, TurnHandler};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::knowledge::KnowledgeBaseTool;
use async_trait::async_trait;
use console::style;
use std::io;

/// Shows a spinner while the agent works on a turn.
struct SpinnerTurns<'a> {
    agent: &'a mut AgentSession,
}

#[async_trait]
impl TurnHandler for SpinnerTurns<'_> {
    async fn handle(&mut self, input: &str) -> Result<AgentOutput> {
        let spinner = Output::spinner("Thinking...");
        let result = self.agent.invoke(input).await;
        spinner.finish_and_clear();
        result
    }
}

/// Run the interactive chat command.
pub async fn run_chat(settings: &Settings, verbose: bool) -> anyhow::Result<()> {
    println!("\n{}", style("Toolchat").bold().cyan());
    println!(
        "{}",
        style("Calculator, weather and knowledge base tools are available.").dim()
    );

    let degraded = match preflight::check(Operation::Chat, settings) {
        Ok(degraded) => degraded,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Run 'toolchat doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    };
    Output::kv("DEEPSEEK_API_KEY", "detected");
    for problem in &degraded {
        Output::warning(&problem.to_string());
    }

    let spinner = Output::spinner("Preparing tools...");
    let agent = create_agent(settings).await;
    spinner.finish_and_clear();
    let mut agent = agent?;

    match agent.tools().knowledge() {
        KnowledgeBaseTool::Live { chunks, .. } => {
            Output::success(&format!("Knowledge base ready ({} chunks).", chunks));
        }
        KnowledgeBaseTool::Failed { reason } => {
            Output::warning(&format!("Knowledge base unavailable: {}", reason));
        }
        KnowledgeBaseTool::Missing => {}
    }
    println!("{}\n", style("Type your question, or 'exit' to quit.").dim());

    let mut turns = SpinnerTurns { agent: &mut agent };
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_loop(&mut turns, stdin.lock(), &mut stdout, LoopOptions { verbose }).await?;

    Ok(())
}
