use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use perturb::{
  Bindings, PerturbationConfig, PerturbationProblem, Symbol, collect_powers,
  expand, find_root, parse_expr,
};
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Log every expansion, collection and solve step to stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Expand an expression into canonical polynomial form
  Expand {
    /// The expression, e.g. "(1 + x)^3"
    expression: String,
  },
  /// Extract the coefficients of powers of a variable
  Collect {
    expression: String,
    #[arg(long)]
    var: String,
    /// Comma-separated powers, e.g. "0,1,2"
    #[arg(long, value_delimiter = ',', default_value = "1")]
    powers: Vec<u32>,
    /// Powers above the largest requested one are discarded; this bound is the
    /// highest one zeroed explicitly
    #[arg(long, default_value_t = 20)]
    bound: u32,
  },
  /// Solve an equation (implicitly == 0) as a perturbation series
  Solve {
    /// The equation, e.g. "x^5 + eps*x - 1"
    equation: String,
    /// The unknown replaced by the series
    #[arg(long)]
    unknown: String,
    /// The perturbation variable
    #[arg(long)]
    var: String,
    #[arg(long, default_value_t = 2)]
    order: usize,
    /// Zeroth-order solution
    #[arg(long, default_value = "0")]
    base: String,
    #[arg(long, default_value_t = 20)]
    bound: u32,
    /// Evaluate the approximation at this value of the perturbation variable
    #[arg(long)]
    at: Option<f64>,
    /// Values for other free symbols, NAME=VALUE
    #[arg(long = "bind", value_parser = parse_binding)]
    bindings: Vec<(String, f64)>,
    /// Skip the check that equation i only involves unknowns up to i
    #[arg(long)]
    no_verify: bool,
  },
  /// Find a root numerically with Newton's method
  Root {
    expression: String,
    #[arg(long)]
    var: String,
    #[arg(long)]
    guess: f64,
    #[arg(long = "bind", value_parser = parse_binding)]
    bindings: Vec<(String, f64)>,
  },
}

fn parse_binding(s: &str) -> Result<(String, f64), String> {
  let (name, value) = s
    .split_once('=')
    .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
  let value: f64 = value
    .trim()
    .parse()
    .map_err(|e| format!("invalid value for {name}: {e}"))?;
  Ok((name.trim().to_string(), value))
}

fn to_bindings(pairs: &[(String, f64)]) -> Bindings {
  pairs
    .iter()
    .map(|(name, value)| (Symbol::new(name.as_str()), *value))
    .collect()
}

fn run(command: Commands) -> Result<()> {
  match command {
    Commands::Expand { expression } => {
      let expr = parse_expr(&expression).context("parsing expression")?;
      println!("{}", expand(&expr)?);
    }
    Commands::Collect {
      expression,
      var,
      powers,
      bound,
    } => {
      let expr = parse_expr(&expression).context("parsing expression")?;
      let coefficients = collect_powers(&expr, &Symbol::new(var.as_str()), &powers, bound)?;
      for (power, coeff) in powers.iter().zip(coefficients) {
        println!("{var}^{power}: {coeff}");
      }
    }
    Commands::Solve {
      equation,
      unknown,
      var,
      order,
      base,
      bound,
      at,
      bindings,
      no_verify,
    } => {
      let equation = parse_expr(&equation).context("parsing equation")?;
      let base = parse_expr(&base).context("parsing base")?;
      let config = PerturbationConfig {
        order,
        max_power_bound: bound,
        verify_triangular: !no_verify,
      };
      let solution = PerturbationProblem::new(equation, unknown.as_str(), var.as_str())
        .with_base(base)
        .with_config(config)
        .solve()
        .context("solving coefficient equations")?;
      for (sym, value) in solution.assignment.iter() {
        println!("{sym} = {value}");
      }
      println!("{unknown} ≈ {}", solution.approximation);
      if let Some(value) = at {
        let number = solution
          .evaluate_at(value, &to_bindings(&bindings))
          .with_context(|| format!("evaluating at {var} = {value}"))?;
        println!("{unknown}({var} = {value}) ≈ {number}");
      }
    }
    Commands::Root {
      expression,
      var,
      guess,
      bindings,
    } => {
      let expr = parse_expr(&expression).context("parsing expression")?;
      let root = find_root(&expr, &Symbol::new(var.as_str()), guess, &to_bindings(&bindings))?;
      println!("{var} -> {root}");
    }
  }
  Ok(())
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
    .init();

  run(cli.command)
}
