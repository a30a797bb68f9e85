fn build_constants() -> miette::Result<()>  {
    let out_dir: std::path::PathBuf = std::env::var("OUT_DIR")
        .map_err(|e| miette::miette!("OUT_DIR not set: {e}"))?
        .into();
    let mut code = Vec::new();
    println!("cargo:rerun-if-env-changed=K");
    let k: usize = std::env::var("K")
        .unwrap_or_else(|_| "31".into())
        .parse()
        .map_err(|e| miette::miette!("Failed to parse K: {e}"))?;
    if k < 2 {
        miette::bail!("K must be ≥ 2, got {k}");
    }
    code.push(format!("pub const DEFAULT_K: usize = {k};"));
    code.push(format!("pub const MIN_K: usize = {};", 2));

    std::fs::write(out_dir.join("constants.rs"), code.join("\n"))
        .map_err(|e| miette::miette!("Failed to write const file: {e}"))?;
    Ok(())
}

fn main() -> miette::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    build_constants()
}
