use clap::Parser;

use explainb::args::ExplainbArgs;
use explainb::run;
use explainb::trace::RunTrace;

fn main() {
    let args = ExplainbArgs::parse();
    let trace = RunTrace::new(args.verbose);
    if let Err(err) = run::run(&args, &trace) {
        eprintln!("explainb: {err}");
        std::process::exit(1);
    }
}
