// Copyright 2018 Chris Pearce
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod command_line_args;

use accretion::itemizer::Itemizer;
use accretion::transaction_reader::TransactionReader;
use accretion::{Accretion, CancelToken, ItemsetWriter, MineStatus, SupportFormat, TransactionDb};
use command_line_args::{parse_args_or_exit, Arguments};

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Arguments) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let miner = Accretion::new(args.to_config()?)?;
    let border = args.border()?;

    info!(input = %args.input_file_path, "reading transactions");
    let timer = Instant::now();
    let mut itemizer = Itemizer::new();
    let db: TransactionDb =
        TransactionReader::open(&args.input_file_path, &mut itemizer, args.weighted)?
            .collect::<Result<_, _>>()?;
    info!(
        transactions = db.len(),
        items = itemizer.len(),
        weight = db.total_weight(),
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "read transactions"
    );

    let total_weight = db.total_weight();
    let config = miner.config();
    let min_support = config.min_support.resolve(total_weight);
    let (recoded, original) = db.recode(min_support);
    let names = itemizer.names_of(&original);

    let border = border.iter().map(|b| b.resolve(total_weight)).collect();
    let filter = config.report_filter(total_weight).with_border(border);
    let format = if config.min_support.is_absolute() {
        SupportFormat::Absolute
    } else {
        SupportFormat::Percent
    };
    let out: Box<dyn Write> = match args.output_path {
        Some(ref path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    let mut writer =
        ItemsetWriter::new(out, names, total_weight, filter, format).with_separator(&args.separator);

    let timer = Instant::now();
    let outcome = miner.mine(&recoded, &mut writer, &CancelToken::new())?;
    writer.flush()?;
    if outcome.status == MineStatus::Cancelled {
        warn!("mining was cancelled; output is incomplete");
    }
    info!(
        item_sets = writer.reported(),
        min_support = outcome.min_support,
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "wrote item sets"
    );

    if args.stats {
        for (size, count) in writer.size_counts().iter().enumerate() {
            eprintln!("{:>4} {}", size, count);
        }
    }

    info!(elapsed_ms = start.elapsed().as_millis() as u64, "total runtime");
    Ok(())
}

fn main() {
    init_logging();
    let arguments = parse_args_or_exit();

    if let Err(err) = run(&arguments) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
