// Repeating a key inside one attribute should abort.

#[derive(faultline_errors::ProblemMetadata)]
#[problem(code = "A", status = 404, code = "B")]
struct Twice;

fn main() {}
