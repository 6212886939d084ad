use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;

use prefix_trie::script::{self, Step};
use prefix_trie::{Client, PrefixTree};

/// Command line client for the prefix tree server.
#[derive(Parser, Debug)]
#[command(version, about = "Insert, delete and complete keys on a trie server.")]
struct Cli {
    /// Address of the trie server
    #[arg(long, env = "TRIE_ADDR", default_value = "127.0.0.1:8080")]
    addr: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inserts <KEY>
    Insert {
        #[arg(required = true)]
        key: Vec<String>,
    },
    /// Deletes <KEY>
    Delete {
        #[arg(required = true)]
        key: Vec<String>,
    },
    /// Checks if <KEY> exists
    Exists {
        #[arg(required = true)]
        key: Vec<String>,
    },
    /// Lists all keys that start with <PREFIX>
    Complete {
        #[arg(required = true)]
        prefix: Vec<String>,
    },
    /// Lists all keys in the trie
    Keys,
    /// Shows the trie as an outline
    Display,
    /// Prints the number of keys in the trie
    Size,
    /// Resets the trie
    Reset,
    /// Runs the test script in <FILE> against the server
    Test { file: PathBuf },
}

/// Multi-word keys are joined back together with single spaces
fn join(words: &[String]) -> String {
    words.join(" ")
}

fn lossy(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

/// Runs one script step, returning its result as JSON
async fn run_step(client: &mut Client, step: &Step) -> anyhow::Result<Value> {
    let command = step.command.as_str();
    let key = match (command, step.arg.as_deref()) {
        ("insert" | "delete" | "exists" | "complete", None) => {
            bail!("{} requires a key.", command)
        }
        (_, arg) => arg.unwrap_or_default(),
    };

    let strings = |keys: Vec<Vec<u8>>| -> Value {
        keys.iter().map(|key| Value::String(lossy(key))).collect()
    };

    let result = match command {
        "insert" => Value::from(client.insert(key).await?),
        "delete" => Value::from(client.delete(key).await?),
        "exists" => Value::from(client.exists(key).await?),
        "complete" => strings(client.complete(key).await?),
        "keys" | "display" => strings(client.keys().await?),
        "size" => Value::from(client.size().await?),
        "reset" => Value::from(client.reset().await?),
        other => bail!("Command {} not found.", other),
    };
    Ok(result)
}

/// Runs every block of the script at `file`, printing one line per block
async fn run_script(client: &mut Client, file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("could not read {}", file.display()))?;
    let blocks = script::blocks(&content);

    let mut failed = 0;
    for (i, lines) in blocks.iter().enumerate() {
        let outcome = match script::parse_block(lines) {
            Ok(step) => match run_step(client, &step).await {
                Ok(actual) => match &step.condition {
                    Some(cond) if !cond.holds(&actual) => Err(format!(
                        "Expected {} but got {}",
                        cond.expected(),
                        actual
                    )),
                    _ => Ok(()),
                },
                Err(e) => Err(format!("Error during test: {}", e)),
            },
            Err(e) => Err(format!("Error during test: {}", e)),
        };

        match outcome {
            Ok(()) => println!("[{}] OK", i + 1),
            Err(msg) => {
                failed += 1;
                println!("[{}] {}", i + 1, msg);
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} blocks failed", failed, blocks.len()));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut client = Client::connect(cli.addr.as_str()).await?;

    match cli.command {
        Command::Insert { key } => {
            let key = join(&key);
            if client.insert(&key).await? {
                println!("Inserted {}", key);
            } else {
                println!("Key {} already exists.", key);
            }
        }
        Command::Delete { key } => {
            let key = join(&key);
            if client.delete(&key).await? {
                println!("Deleted {}", key);
            } else {
                println!("Key {} did not exist.", key);
            }
        }
        Command::Exists { key } => {
            let key = join(&key);
            if client.exists(&key).await? {
                println!("{} exists.", key);
            } else {
                println!("{} does not exist.", key);
            }
        }
        Command::Complete { prefix } => {
            let prefix = join(&prefix);
            let mut suggestions = client.complete(&prefix).await?;
            if suggestions.is_empty() {
                println!("{} is not a prefix.", prefix);
            } else {
                suggestions.sort();
                println!("Suggestions");
                for suggestion in suggestions {
                    println!("{}", lossy(&suggestion));
                }
            }
        }
        Command::Keys => {
            let mut keys = client.keys().await?;
            keys.sort();
            for key in keys {
                println!("{}", lossy(&key));
            }
        }
        Command::Display => {
            let keys = client.keys().await?;
            if keys.is_empty() {
                println!("Trie is empty.");
            } else {
                let tree: PrefixTree = keys.into_iter().collect();
                print!("{}", tree);
            }
        }
        Command::Size => {
            println!("{}", client.size().await?);
        }
        Command::Reset => {
            if client.reset().await? {
                println!("Trie has been reset.");
            } else {
                println!("Trie could not be reset.");
            }
        }
        Command::Test { file } => run_script(&mut client, &file).await?,
    }

    Ok(())
}
