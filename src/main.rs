use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use serde::Serialize;
#[macro_use]
extern crate text_io;
use crate::solver::{Alphabet, Position, Problem, Solution, SolveOutcome, Wordlist};

mod solver;

/// Finds every way to spell the hidden words of a letter-grid puzzle,
/// letting the remaining letters fall after each word is removed.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Puzzle file: board rows line by line, then a final line with the
    /// comma-separated word constraints. Prompted for when omitted.
    problem: Option<PathBuf>,

    /// Wordlist file, one entry per line (dict.cc exports work as-is).
    #[arg(short, long, env = "WORDFALL_WORDLIST")]
    wordlist: PathBuf,

    /// Letters the puzzle may use.
    #[arg(long, default_value = "abcdefghijklmnopqrstuvwxyzäöüß")]
    alphabet: String,

    /// Placeholder standing for an unknown letter in hints.
    #[arg(long, default_value_t = '_')]
    placeholder: char,

    /// Emit the solution chains as JSON instead of printed boards.
    #[arg(long)]
    json: bool,

    /// After each word, confirm which spelling is on your board and drop
    /// the others.
    #[arg(long)]
    review: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run(Args::parse()) {
        eprintln!("Error: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(args: Args) -> anyhow::Result<()> {
    let alphabet = Alphabet::new(&args.alphabet, args.placeholder)?;
    let wordlist = Wordlist::load(&args.wordlist, &alphabet)
        .with_context(|| format!("failed to load wordlist {}", args.wordlist.display()))?;
    if wordlist.is_empty() {
        bail!("wordlist {} contains no usable words", args.wordlist.display());
    }
    info!("loaded {} words", wordlist.len());

    let (rows, constraints) = match &args.problem {
        Some(path) => read_problem_file(path)?,
        None => prompt_problem(),
    };

    let mut problem = Problem::new(&rows, &constraints, Arc::new(wordlist.into_words()), alphabet)?;
    println!("Board:");
    println!("{}", problem.grid());

    let outcome = if args.review {
        solve_with_review(&mut problem)?
    } else {
        problem.solve()?
    };

    if let SolveOutcome::Unsolved { word } = outcome {
        bail!(
            "no spelling found for word {}; check the board, constraints and wordlist",
            word + 1
        );
    }

    if args.json {
        print_json(&problem)?;
    } else {
        print_chains(&problem);
    }
    Ok(())
}

/// Reads a puzzle file: board rows first, the last non-empty line is the
/// comma-separated constraint list.
fn read_problem_file(path: &Path) -> anyhow::Result<(Vec<String>, String)> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut lines: Vec<String> = contents
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    let constraints = match lines.pop() {
        Some(constraints) => constraints,
        None => bail!("{} is empty", path.display()),
    };
    if lines.is_empty() {
        bail!(
            "{} has no board rows before the constraint line",
            path.display()
        );
    }
    Ok((lines, constraints))
}

/// Prompts for the board (one row per line, empty line to finish) and the
/// constraint list.
fn prompt_problem() -> (Vec<String>, String) {
    println!("Enter the board, one row per line; finish with an empty line:");
    let mut rows = Vec::new();
    loop {
        let line: String = read!("{}\n");
        let line = line.trim().to_string();
        if line.is_empty() {
            break;
        }
        rows.push(line);
    }
    println!("Enter the word constraints (comma separated, e.g. 6,c__,4):");
    let constraints: String = read!("{}\n");
    (rows, constraints.trim().to_string())
}

/// Runs one search round per word; after each intermediate round the user
/// confirms or rejects spellings before the next word starts.
fn solve_with_review(problem: &mut Problem) -> anyhow::Result<SolveOutcome> {
    while let Some(index) = problem.first_unsolved() {
        problem.prepare_candidates()?;
        if !problem.launch_search()? {
            return Ok(SolveOutcome::Unsolved { word: index });
        }
        problem.await_search();
        if !problem.is_word_solved(index) {
            return Ok(SolveOutcome::Unsolved { word: index });
        }
        if index + 1 < problem.words().len() {
            review_round(problem, index);
        }
    }
    Ok(SolveOutcome::AllSolved)
}

/// Shows the spellings found for word `index`. The user either keeps the
/// one that matched their board (dropping the rest) or rejects spellings
/// one at a time, staying undecided between the remaining ones. Dropped
/// spellings take their future descendants with them.
fn review_round(problem: &Problem, index: usize) {
    let word = &problem.words()[index];
    loop {
        let solutions = word.valid_solutions();
        let mut found: Vec<&str> = Vec::new();
        for solution in &solutions {
            if !found.contains(&solution.found_word()) {
                found.push(solution.found_word());
            }
        }
        found.sort_unstable();
        if found.len() <= 1 {
            return;
        }

        println!("Word {} could be:", index + 1);
        for (i, candidate) in found.iter().enumerate() {
            println!("  [{}] {}", i + 1, candidate);
        }
        println!("Keep a spelling with its number, reject one with -number (0 keeps all):");
        let answer: String = read!("{}\n");
        let answer = answer.trim();
        let (reject, choice) = match answer.strip_prefix('-') {
            Some(rest) => (true, rest.parse::<usize>().unwrap_or(0)),
            None => (false, answer.parse::<usize>().unwrap_or(0)),
        };
        if choice == 0 || choice > found.len() {
            return;
        }

        if reject {
            word.reject_spelling(found[choice - 1]);
            continue;
        }
        word.keep_spelling(found[choice - 1]);
        return;
    }
}

fn print_chains(problem: &Problem) {
    let chains = problem.final_chains();
    if chains.is_empty() {
        println!("No chains left to show.");
        return;
    }
    println!("{} complete chains:", chains.len());
    for (i, chain) in chains.iter().enumerate() {
        println!("============ chain {} ============", i + 1);
        for (step, solution) in chain.iter().enumerate() {
            println!("word {}: {}", step + 1, solution.found_word());
            print!("{}", render_step(solution));
        }
    }
}

/// One board with the solution's path numbered beside the letters.
fn render_step(solution: &Solution) -> String {
    let mut out = String::new();
    for (row, letters) in solution.letters_before().iter().enumerate() {
        for (col, &letter) in letters.iter().enumerate() {
            match solution.path_index(Position { row, col }) {
                Some(index) => out.push_str(&format!("{}{:<2} ", letter, index + 1)),
                None => out.push_str(&format!("{}   ", letter)),
            }
        }
        out.push('\n');
    }
    out
}

#[derive(Serialize)]
struct ChainStep<'a> {
    word: &'a str,
    /// Cell -> 1-based path position, null for unused cells.
    path: Vec<Vec<Option<usize>>>,
    board: Vec<String>,
}

#[derive(Serialize)]
struct SolveReport<'a> {
    board: Vec<String>,
    chains: Vec<Vec<ChainStep<'a>>>,
}

fn print_json(problem: &Problem) -> anyhow::Result<()> {
    let chains = problem.final_chains();
    let report = SolveReport {
        board: problem
            .grid()
            .original_letters()
            .iter()
            .map(|row| row.iter().collect())
            .collect(),
        chains: chains
            .iter()
            .map(|chain| {
                chain
                    .iter()
                    .map(|solution| ChainStep {
                        word: solution.found_word(),
                        path: solution
                            .path()
                            .iter()
                            .map(|row| row.iter().map(|index| index.map(|i| i + 1)).collect())
                            .collect(),
                        board: solution
                            .letters_before()
                            .iter()
                            .map(|row| row.iter().collect())
                            .collect(),
                    })
                    .collect()
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
