// Keys other than code/status/doc/title should abort.

#[derive(faultline_errors::ProblemMetadata)]
#[problem(code = "A", severity = "high")]
struct Severe;

fn main() {}
