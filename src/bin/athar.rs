// ─────────────────────────────────────────────────────────────────────────────
//  Athar: Funds-Flow Tracer
//
//  Athar (أثر): "The Trace". Follows value from an address or entity across
//  the transaction graph, hop by hop, and reports who it reached.
// ─────────────────────────────────────────────────────────────────────────────

use athar::engine::athar::Athar;
use athar::engine::athar::SearchArgs;
use athar::error::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
  let args = SearchArgs::parse();
  Athar::run(args).await?;
  Ok(())
}
