//! Symbols for the empty elements of Content MathML.

/// Constant elements and the symbol each stands for.
pub(crate) static CONSTANTS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "pi" => "V!π",
    "exponentiale" => "V!e",
    "imaginaryi" => "V!i",
    "eulergamma" => "V!γ",
    "infinity" => "V!∞",
    "emptyset" => "V!∅",
    "notanumber" => "V!NaN",
    "naturalnumbers" => "V!ℕ",
    "integers" => "V!ℤ",
    "rationals" => "V!ℚ",
    "reals" => "V!ℝ",
    "complexes" => "V!ℂ",
    "primes" => "V!ℙ",
    "true" => "T!true",
    "false" => "T!false",
};

/// Operator elements and the operator text each is written as in Presentation MathML.
pub(crate) static OPERATORS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    // arithmetic
    "plus" => "+",
    "minus" => "-",
    "times" => "×",
    "divide" => "÷",
    "power" => "^",
    "rem" => "mod",
    "quotient" => "div",
    "factorial" => "!",
    "max" => "max",
    "min" => "min",
    "gcd" => "gcd",
    "lcm" => "lcm",
    "abs" => "|",
    "floor" => "⌊",
    "ceiling" => "⌈",
    "conjugate" => "¯",
    "arg" => "arg",
    "real" => "ℜ",
    "imaginary" => "ℑ",
    "root" => "√",
    "exp" => "exp",
    "ln" => "ln",
    "log" => "log",
    // relations
    "eq" => "=",
    "neq" => "≠",
    "gt" => ">",
    "lt" => "<",
    "geq" => "≥",
    "leq" => "≤",
    "equivalent" => "≡",
    "approx" => "≈",
    "factorof" => "∣",
    "tendsto" => "→",
    // logic
    "and" => "∧",
    "or" => "∨",
    "xor" => "⊻",
    "not" => "¬",
    "implies" => "⇒",
    "forall" => "∀",
    "exists" => "∃",
    // sets
    "in" => "∈",
    "notin" => "∉",
    "subset" => "⊆",
    "prsubset" => "⊂",
    "notsubset" => "⊈",
    "notprsubset" => "⊄",
    "union" => "∪",
    "intersect" => "∩",
    "setdiff" => "∖",
    "cartesianproduct" => "×",
    "card" => "#",
    // functions
    "compose" => "∘",
    "ident" => "id",
    "inverse" => "-1",
    "domain" => "dom",
    "codomain" => "codom",
    "image" => "im",
    // calculus
    "int" => "∫",
    "diff" => "d",
    "partialdiff" => "∂",
    "sum" => "∑",
    "product" => "∏",
    "limit" => "lim",
    "divergence" => "div",
    "grad" => "∇",
    "curl" => "curl",
    "laplacian" => "∇²",
    // elementary functions
    "sin" => "sin",
    "cos" => "cos",
    "tan" => "tan",
    "sec" => "sec",
    "csc" => "csc",
    "cot" => "cot",
    "sinh" => "sinh",
    "cosh" => "cosh",
    "tanh" => "tanh",
    "sech" => "sech",
    "csch" => "csch",
    "coth" => "coth",
    "arcsin" => "arcsin",
    "arccos" => "arccos",
    "arctan" => "arctan",
    "arcsec" => "arcsec",
    "arccsc" => "arccsc",
    "arccot" => "arccot",
    "arcsinh" => "arcsinh",
    "arccosh" => "arccosh",
    "arctanh" => "arctanh",
    "arcsech" => "arcsech",
    "arccsch" => "arccsch",
    "arccoth" => "arccoth",
    // linear algebra
    "determinant" => "det",
    "transpose" => "T",
    "selector" => "sel",
    "vectorproduct" => "×",
    "scalarproduct" => "⋅",
    "outerproduct" => "⊗",
    // statistics
    "mean" => "mean",
    "sdev" => "σ",
    "variance" => "var",
    "median" => "median",
    "mode" => "mode",
    "moment" => "moment",
};

/// Elements that qualify the operator of an `apply` rather than being operands.
pub(crate) fn is_qualifier(name: &str) -> bool {
    matches!(
        name,
        "bvar"
            | "lowlimit"
            | "uplimit"
            | "condition"
            | "domainofapplication"
            | "degree"
            | "logbase"
            | "momentabout"
    )
}
