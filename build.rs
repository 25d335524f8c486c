// Compiles the trimmed dish device proto into a tonic client

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let protoc_path = protoc_bin_vendored::protoc_bin_path()?;
    // SAFETY: build scripts are single-threaded.
    unsafe { std::env::set_var("PROTOC", protoc_path) };

    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .compile_protos(&["proto/device.proto"], &["proto"])?;
    println!("cargo:rerun-if-changed=proto/device.proto");
    Ok(())
}
