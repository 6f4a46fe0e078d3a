//! Shared test fixtures: sample submissions and assessment inputs.

use crate::assessment::AssessmentInput;

/// Python triangle built with a loop; should score well.
pub const LOOPED_PYTHON_TRIANGLE: &str = "# Print a right triangle pattern of height n\ndef triangle(n):\n    for i in range(1, n + 1):\n        row = \"*\" * i\n        print(row)\n\n\nn = int(input())\ntriangle(n)\n";

/// The same triangle printed line by line.
pub const HARDCODED_PYTHON_TRIANGLE: &str =
    "# triangle pattern\nprint(\"*\")\nprint(\"**\")\nprint(\"***\")\nprint(\"****\")\nprint(\"*****\")\n";

/// C pyramid built with nested loops.
pub const LOOPED_C_PYRAMID: &str = r#"#include <stdio.h>

/* Print a pyramid of stars */
int main() {
    int n;
    scanf("%d", &n);
    for (int i = 1; i <= n; i++) {
        for (int j = i; j < n; j++) {
            printf(" ");
        }
        for (int j = 1; j <= 2 * i - 1; j++) {
            printf("*");
        }
        printf("\n");
    }
    return 0;
}
"#;

/// A clean, fully specified submission.
pub fn sample_input() -> AssessmentInput {
    AssessmentInput::new(85.0)
        .with_code(LOOPED_PYTHON_TRIANGLE)
        .with_tests(5, 5)
        .with_efficiency(80.0)
        .with_readability(80.0)
        .with_complexity("O(n)", "O(1)")
}

/// Input with only correctness and test counts.
pub fn minimal_input(correctness: f64, passed: u32, total: u32) -> AssessmentInput {
    AssessmentInput::new(correctness).with_tests(passed, total)
}
