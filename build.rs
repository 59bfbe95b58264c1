use std::env;
use std::fs;
use std::path::PathBuf;

// Words of u64 a single packed panel may hold. Mirrors `PACK_CAPACITY` in the crate.
const PACK_CAPACITY: usize = 128_000;

// Largest tile dimension any micro-kernel uses (8 rows by 6 columns).
const MAX_TILE_DIM: usize = 8;

// Cache blocking parameter we let users tune at build time
#[derive(Debug)]
struct BlockParam {
    env_var: &'static str,
    const_name: &'static str,
    default: usize,
    doc: &'static str,
}

impl BlockParam {
    fn params() -> Vec<BlockParam> {
        vec![
            BlockParam {
                env_var: "BGEMM_KC",
                const_name: "KC",
                default: 32,
                doc: "Depth block, in 64-bit words, processed per inner-kernel call.",
            },
            BlockParam {
                env_var: "BGEMM_MC",
                const_name: "MC",
                default: 32,
                doc: "Row block of A processed per inner-kernel call.",
            },
        ]
    }

    // Reads the override from the environment, falling back to the default.
    fn resolve(&self) -> usize {
        println!("cargo:rerun-if-env-changed={}", self.env_var);

        match env::var(self.env_var) {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(value) => value,
                Err(_) => panic!("{} must be a positive integer, got {raw:?}", self.env_var),
            },
            Err(_) => self.default,
        }
    }
}

fn validate(kc: usize, mc: usize) {
    if kc == 0 || kc % 2 != 0 {
        panic!("BGEMM_KC must be a non-zero even number of words, got {kc}");
    }
    if kc * MAX_TILE_DIM > PACK_CAPACITY {
        panic!(
            "BGEMM_KC={kc} overflows the packed panel capacity \
             ({PACK_CAPACITY} words for {MAX_TILE_DIM} rows)"
        );
    }
    if mc == 0 {
        panic!("BGEMM_MC must be non-zero");
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let params = BlockParam::params();
    let values: Vec<usize> = params.iter().map(BlockParam::resolve).collect();

    validate(values[0], values[1]);

    let mut generated = String::from("// Generated by build.rs. Do not edit.\n");
    for (param, value) in params.iter().zip(&values) {
        generated.push_str(&format!(
            "\n/// {}\n///\n/// Override with the `{}` environment variable at build time.\n\
             pub const {}: usize = {};\n",
            param.doc, param.env_var, param.const_name, value
        ));
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo always sets OUT_DIR"));
    fs::write(out_dir.join("config.rs"), generated).expect("failed to write config.rs");
}
