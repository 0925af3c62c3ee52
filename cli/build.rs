fn read_git_hash() -> Option<String> {
    let git_head = std::fs::read_to_string("../.git/HEAD").ok()?;
    match git_head.trim_end().strip_prefix("ref: ") {
        Some(git_ref) => {
            println!("cargo:rerun-if-changed=../.git/{git_ref}");
            Some(std::fs::read_to_string(format!("../.git/{git_ref}")).ok()?.trim_end().to_owned())
        }
        None => Some(git_head.trim_end().to_owned()),
    }
}

fn main() {
    println!("cargo:rerun-if-changed=../.git/HEAD");
    let git_hash = read_git_hash().unwrap_or_else(|| "unknown".to_owned());
    println!("cargo:rustc-env=GIT_HASH={git_hash}");
}
