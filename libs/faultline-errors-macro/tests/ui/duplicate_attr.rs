// Two #[problem] attributes on one item should abort.

#[derive(faultline_errors::ProblemMetadata)]
#[problem(code = "A")]
#[problem(code = "B")]
struct Doubled;

fn main() {}
