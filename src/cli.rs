use clap::Parser;

/// Stream frames from a camera through generic capture properties.
///
/// Unset options fall back to the configuration file, then to the built-in
/// defaults shown in each option's help.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Camera index [default: 0]
    #[arg(short, long)]
    pub index: Option<u32>,

    /// Exposure time in microseconds, -1 for auto [default: -1]
    #[arg(short, long, allow_hyphen_values = true)]
    pub exposure: Option<f64>,

    /// Gain in dB, -1 for auto [default: -1]
    #[arg(short, long, allow_hyphen_values = true)]
    pub gain: Option<f64>,

    #[arg(short = 'G', long)]
    pub gamma: Option<f64>,

    /// Exposure compensation in EV
    #[arg(short, long, allow_hyphen_values = true)]
    pub brightness: Option<f64>,

    #[arg(short, long)]
    pub fps: Option<f64>,

    /// Display scale of each frame [default: 0.25]
    #[arg(short, long)]
    pub scale: Option<f32>,

    /// Number of frames to grab [default: 10]
    #[arg(short = 'n', long)]
    pub frames: Option<usize>,

    /// Frames averaged into each output frame [default: 1]
    #[arg(long)]
    pub average: Option<usize>,

    /// Folder to save scaled frames to as PNG
    #[arg(long)]
    pub save: Option<String>,

    /// Print every property as JSON and exit
    #[arg(long)]
    pub dump_properties: bool,

    /// Increase log verbosity (-d debug, -dd trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    #[arg(long)]
    pub log_file: Option<String>,

    #[arg(long)]
    pub config: Option<String>,
}
