// Statuses outside 100..=599 should abort.

#[derive(faultline_errors::ProblemMetadata)]
#[problem(code = "TEAPOT", status = 600)]
struct Teapot;

fn main() {}
