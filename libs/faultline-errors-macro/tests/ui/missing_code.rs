// A #[problem] attribute without `code` should abort.

#[derive(faultline_errors::ProblemMetadata)]
#[problem(status = 404)]
struct MissingCode;

fn main() {}
