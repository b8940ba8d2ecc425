fn main() -> Result<(), Box<dyn std::error::Error>> {
    let services_dir = "../../proto/services";

    println!("cargo:rerun-if-changed={}/forum_service.proto", services_dir);

    // Client only; the server half lives in forum-service
    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .compile_protos(
            &[format!("{services_dir}/forum_service.proto")],
            &[services_dir],
        )?;

    Ok(())
}
