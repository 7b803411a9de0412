use clap::ValueEnum;

/// How command results are written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable target tree
	#[default]
	Text,
	/// Pretty-printed JSON envelope
	Json,
	/// One compact envelope per line, suited to `watch`
	Ndjson,
	/// TOON encoding of the envelope
	Toon,
}
