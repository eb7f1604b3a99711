// Unions are rejected.

#[derive(faultline_errors::ProblemMetadata)]
union Bits {
    int: u32,
    float: f32,
}

fn main() {}
