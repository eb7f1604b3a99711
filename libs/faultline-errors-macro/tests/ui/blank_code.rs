// A whitespace-only `code` should abort.

#[derive(faultline_errors::ProblemMetadata)]
#[problem(code = "   ", status = 400)]
struct BlankCode;

fn main() {}
