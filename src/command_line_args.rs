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

use std::env;
use std::io;
use std::process;

use accretion::{ConfigError, MinSupport, MinerConfig, Statistic, Target};
use argparse::{ArgumentParser, Store, StoreOption, StoreTrue};

pub struct Arguments {
    pub input_file_path: String,
    pub output_path: Option<String>,
    pub target: char,
    pub min_size: usize,
    pub max_size: Option<usize>,
    pub min_support: f64,
    pub max_support: Option<f64>,
    pub statistic: char,
    pub significance_percent: f64,
    pub invalidate: bool,
    pub max_extensions: i64,
    pub weighted: bool,
    pub border: Option<String>,
    pub separator: String,
    pub stats: bool,
}

impl Default for Arguments {
    fn default() -> Self {
        Arguments {
            input_file_path: String::new(),
            output_path: None,
            target: 'm',
            min_size: 2,
            max_size: None,
            min_support: 1.0,
            max_support: None,
            statistic: 'p',
            significance_percent: 1.0,
            invalidate: false,
            max_extensions: 2,
            weighted: false,
            border: None,
            separator: String::from(" "),
            stats: false,
        }
    }
}

impl Arguments {
    pub fn to_config(&self) -> Result<MinerConfig, ConfigError> {
        let config = MinerConfig {
            target: Target::from_code(self.target)?,
            min_support: MinSupport::from_arg(self.min_support),
            max_support: self.max_support.map(MinSupport::from_arg),
            min_size: self.min_size,
            max_size: self.max_size,
            statistic: Statistic::from_code(self.statistic)?,
            significance: self.significance_percent / 100.0,
            invalidate_below_expectation: self.invalidate,
            max_extensions: if self.max_extensions < 0 {
                None
            } else {
                Some(self.max_extensions as usize)
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Minimum supports per item set size, starting at the minimum size.
    pub fn border(&self) -> Result<Vec<MinSupport>, ConfigError> {
        match self.border {
            Some(ref border) => parse_border(border),
            None => Ok(vec![]),
        }
    }
}

/// Parses a colon separated list of supports, each interpreted like
/// `--min-support`.
fn parse_border(border: &str) -> Result<Vec<MinSupport>, ConfigError> {
    border
        .split(':')
        .map(|field| {
            field
                .trim()
                .parse::<f64>()
                .map(MinSupport::from_arg)
                .map_err(|_| ConfigError::InvalidBorder(field.to_owned()))
        })
        .collect()
}

fn parse_args(argv: Vec<String>) -> Result<Arguments, i32> {
    let mut args = Arguments::default();
    {
        let mut parser = ArgumentParser::new();
        parser.set_description(
            "Find frequent item sets whose items occur together significantly \
             more often than independence would predict.",
        );

        parser
            .refer(&mut args.input_file_path)
            .add_option(&["--input"], Store, "Input transactions, one per line.")
            .metavar("file_path")
            .required();

        parser
            .refer(&mut args.output_path)
            .add_option(
                &["--output"],
                StoreOption,
                "File in which to store item sets; stdout if omitted. \
                 Format: items (support,p-value%).",
            )
            .metavar("file_path");

        parser
            .refer(&mut args.target)
            .add_option(
                &["--target"],
                Store,
                "Item sets to report: s (all frequent), c (closed), m (maximal).",
            )
            .metavar("type");

        parser
            .refer(&mut args.min_size)
            .add_option(&["--min-size"], Store, "Minimum number of items per item set.")
            .metavar("count");

        parser
            .refer(&mut args.max_size)
            .add_option(&["--max-size"], StoreOption, "Maximum number of items per item set.")
            .metavar("count");

        parser
            .refer(&mut args.min_support)
            .add_option(
                &["--min-support"],
                Store,
                "Minimum support of an item set. Positive: percentage of \
                 transactions, negative: absolute number.",
            )
            .metavar("support");

        parser
            .refer(&mut args.max_support)
            .add_option(
                &["--max-support"],
                StoreOption,
                "Maximum support of an item set, in the same units as --min-support.",
            )
            .metavar("support");

        parser
            .refer(&mut args.statistic)
            .add_option(
                &["--stat"],
                Store,
                "Test statistic: x (none), c/p/n (chi^2), y/t (chi^2 with Yates \
                 correction), i/g (G statistic), f (Fisher, probability), \
                 h (Fisher, chi^2), m (Fisher, information), s (Fisher, support).",
            )
            .metavar("code");

        parser
            .refer(&mut args.significance_percent)
            .add_option(&["--siglvl"], Store, "Significance level in percent.")
            .metavar("percent");

        parser.refer(&mut args.invalidate).add_option(
            &["--invalidate"],
            StoreTrue,
            "Treat extensions with support not above the support expected \
             under independence as not significant.",
        );

        parser
            .refer(&mut args.max_extensions)
            .add_option(
                &["--max-ext"],
                Store,
                "Maximum number of extensions tried per item set; negative for no limit.",
            )
            .metavar("count");

        parser.refer(&mut args.weighted).add_option(
            &["--weighted"],
            StoreTrue,
            "Read an integer transaction weight from the last field of each line.",
        );

        parser
            .refer(&mut args.border)
            .add_option(
                &["--border"],
                StoreOption,
                "Colon separated minimum supports for item sets of the minimum \
                 size, the minimum size plus one, and so on.",
            )
            .metavar("supports");

        parser
            .refer(&mut args.separator)
            .add_option(&["--separator"], Store, "Item separator in the output.")
            .metavar("text");

        parser.refer(&mut args.stats).add_option(
            &["--stats"],
            StoreTrue,
            "Print the number of reported item sets per size to stderr.",
        );

        parser.parse(argv, &mut io::stdout(), &mut io::stderr())?;
    }
    Ok(args)
}

pub fn parse_args_or_exit() -> Arguments {
    let argv: Vec<String> = env::args().collect();
    if argv.len() == 1 {
        eprintln!("Usage: {} --input file_path [options]; see --help", argv[0]);
        process::exit(1);
    }

    let args = match parse_args(argv) {
        Ok(args) => args,
        Err(code) => process::exit(code),
    };

    if let Err(err) = args.to_config().and(args.border()) {
        eprintln!("{}", err);
        process::exit(1);
    }

    args
}
