// A `doc` that is not a URI reference should abort.

#[derive(faultline_errors::ProblemMetadata)]
#[problem(code = "BROKEN", doc = "not a uri")]
struct Broken;

fn main() {}
