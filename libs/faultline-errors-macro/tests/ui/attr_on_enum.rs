// On enums the attribute belongs on variants only.

#[derive(faultline_errors::ProblemMetadata)]
#[problem(code = "LOAN")]
enum LoanError {
    #[problem(code = "LOAN_NOT_FOUND", status = 404)]
    NotFound,
}

fn main() {}
