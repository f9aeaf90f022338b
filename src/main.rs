use agent_calculator::{DeliveryPolicy, Lexer, Model, ModelConfig, Postfix};
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::EnvFilter;

const DEFAULT_EXPR: &str = "2 + 3 * 4 - 5";

#[derive(Parser, Debug)]
#[command(version, about = "Evaluate arithmetic through a team of operator agents")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate an expression step by step.
    Eval {
        #[arg(default_value = DEFAULT_EXPR)]
        expr: String,

        /// Print what every step did.
        #[arg(short, long)]
        trace: bool,

        /// Let each agent answer all of its pending requests in one step.
        #[arg(short, long)]
        drain: bool,
    },
    /// Print the tokens of an expression.
    Tokenize { expr: String },
    /// Print an expression in postfix order.
    Postfix { expr: String },
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Eval { expr, trace, drain } => {
            let delivery = if drain {
                DeliveryPolicy::Drain
            } else {
                DeliveryPolicy::OnePerStep
            };
            let mut model = Model::with_config(expr, ModelConfig::default().with_delivery(delivery));

            while model.is_running() {
                model.step();
                if trace {
                    let coordinator = model.coordinator();
                    let busy: Vec<_> = model
                        .agents()
                        .iter()
                        .filter(|agent| agent.is_active())
                        .map(|agent| agent.operation().name())
                        .collect();
                    println!(
                        "[{:>3}] {:<28} stack: {:?} busy: {busy:?}",
                        model.steps(),
                        coordinator
                            .last_event()
                            .map(ToString::to_string)
                            .unwrap_or_default(),
                        coordinator.stack(),
                    );
                }
            }

            let result = model.finish()?;
            println!("{result}");
        }
        Commands::Tokenize { expr } => {
            for token in Lexer::new(&expr) {
                println!("{}", token?);
            }
            println!("EOF");
        }
        Commands::Postfix { expr } => {
            let postfix = Postfix::parse(&expr)?;
            println!("{postfix}");
        }
    }
    Ok(())
}
