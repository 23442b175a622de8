//! Build script for signum-edit
//! Generates the formula parser from `src/formula/grammar.lalrpop`

fn main() {
    lalrpop::Configuration::new()
        .use_cargo_dir_conventions()
        .process()
        .unwrap();
}
