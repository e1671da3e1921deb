//! Result writers: one JSON object per line, or CSV with a header row.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;

use crate::simulator::GameResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Jsonl,
    Csv,
}

enum Sink {
    Jsonl(Box<dyn Write>),
    Csv(csv::Writer<Box<dyn Write>>),
}

pub struct OutputWriter {
    sink: Sink,
}

impl OutputWriter {
    /// Write to `path`, or stdout when `None`.
    pub fn new(path: Option<&Path>, format: OutputFormat) -> io::Result<Self> {
        let target: Box<dyn Write> = match path {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(BufWriter::new(io::stdout())),
        };
        let sink = match format {
            OutputFormat::Jsonl => Sink::Jsonl(target),
            OutputFormat::Csv => Sink::Csv(csv::Writer::from_writer(target)),
        };
        Ok(Self { sink })
    }

    pub fn write_game(&mut self, result: &GameResult) -> Result<(), Box<dyn std::error::Error>> {
        match &mut self.sink {
            Sink::Jsonl(writer) => {
                let json = serde_json::to_string(result)?;
                writeln!(writer, "{json}")?;
            }
            Sink::Csv(writer) => writer.serialize(result)?,
        }
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<()> {
        match &mut self.sink {
            Sink::Jsonl(writer) => writer.flush(),
            Sink::Csv(writer) => writer.flush(),
        }
    }
}
