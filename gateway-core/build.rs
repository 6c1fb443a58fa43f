use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_root = PathBuf::from("../proto");

    // Tell cargo to recompile if any proto files change
    println!("cargo:rerun-if-changed=../proto/v1/");

    // Downstream services are only ever called, never served, from here
    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .compile_protos(
            &[
                "../proto/v1/authz.proto",
                "../proto/v1/board.proto",
                "../proto/v1/card.proto",
                "../proto/v1/category.proto",
                "../proto/v1/tag.proto",
                "../proto/v1/user.proto",
            ],
            &[&proto_root],
        )?;

    Ok(())
}
