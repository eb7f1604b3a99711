// Structs must carry a #[problem] attribute.

#[derive(faultline_errors::ProblemMetadata)]
struct Bare;

fn main() {}
