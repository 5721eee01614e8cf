use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use glam::Vec3;
use model_showcase::asset::{AssetError, AssetLocation, AssetRequest};
use model_showcase::config::{DEFAULT_ASSET, DRACO_DECODER_PATH};
use model_showcase::loaders::{load_model, LoadError};
use model_showcase::viewer::Viewer;

const PILLAR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/pillar.gltf");
const DRACO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/draco_required.gltf");
const SPLIT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/split/pillar.gltf");
const TEXTURED: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/textured.gltf");

const SPLIT_GLTF: &[u8] = include_bytes!("fixtures/split/pillar.gltf");
const SPLIT_BIN: &[u8] = include_bytes!("fixtures/split/pillar.bin");

fn settle(viewer: &mut Viewer) {
    for _ in 0..20 {
        viewer.advance(1.0);
    }
}

fn load_into(viewer: &mut Viewer, reference: &str) {
    let request = viewer.begin_load(reference).expect("reference should validate");
    let outcome = load_model(&request).map_err(LoadError::from);
    viewer.finish_load(outcome);
}

/// Serves `files` by path for `requests` connections; the handle yields the
/// requested paths in order
fn serve_files(
    files: Vec<(&'static str, &'static [u8])>,
    requests: usize,
) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..requests {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }

            let path = request_line
                .split_whitespace()
                .nth(1)
                .unwrap_or_default()
                .to_string();
            let body = files
                .iter()
                .find(|(name, _)| *name == path)
                .map(|(_, body)| *body);
            let status = if body.is_some() { "200 OK" } else { "404 Not Found" };
            let body = body.unwrap_or_default();
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(body).unwrap();
            seen.push(path);
        }
        seen
    });

    (format!("http://{addr}"), handle)
}

#[cfg(test)]
mod viewer_tests {
    use super::*;

    #[test]
    fn test_unsupported_extension_fails_before_loading() {
        let mut viewer = Viewer::new(800, 600);

        let request = viewer.begin_load("foo.obj");

        assert!(request.is_none());
        assert!(!viewer.status().is_loading());
        assert_eq!(
            viewer.status().error(),
            Some(AssetError::UnsupportedFormat("foo.obj".into()).to_string().as_str())
        );
        assert!(viewer.scene.model.is_empty());
    }

    #[test]
    fn test_empty_reference_is_rejected() {
        assert_eq!(AssetRequest::parse("   "), Err(AssetError::Empty));
    }

    #[test]
    fn test_pillar_is_framed_from_its_bounds() {
        let mut viewer = Viewer::new(800, 600);

        load_into(&mut viewer, PILLAR);
        settle(&mut viewer);

        assert_eq!(viewer.status().error(), None);
        assert!(!viewer.status().is_loading());

        let model = viewer.scene.model.current().unwrap();
        let bounds = model.bounds.unwrap();
        assert!(bounds.min.abs_diff_eq(Vec3::new(-0.5, 0.0, -0.5), 1e-5));
        assert!(bounds.max.abs_diff_eq(Vec3::new(0.5, 2.0, 0.5), 1e-5));

        assert!(viewer.controls.target().abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-3));
        assert!(viewer
            .camera
            .position
            .abs_diff_eq(Vec3::new(1.5, 2.2, 3.0), 1e-3));
    }

    #[test]
    fn test_pillar_gets_generated_normals() {
        let request = AssetRequest::parse(PILLAR).unwrap();
        let model = load_model(&request).unwrap();

        assert_eq!(model.triangle_count(), 12);
        for mesh in &model.meshes {
            assert_eq!(mesh.normals.len(), mesh.positions.len());
        }
    }

    #[test]
    fn test_second_load_replaces_first() {
        let mut viewer = Viewer::new(800, 600);

        load_into(&mut viewer, DEFAULT_ASSET);
        let first = viewer.scene.model.generation();
        load_into(&mut viewer, PILLAR);

        assert_eq!(viewer.scene.model.len(), 1);
        assert!(viewer.scene.model.generation() > first);
        assert_eq!(viewer.scene.model.current().unwrap().name, "pillar");
    }

    #[test]
    fn test_draco_model_names_decoder() {
        let mut viewer = Viewer::new(800, 600);

        load_into(&mut viewer, DRACO);

        let error = viewer.status().error().unwrap();
        assert!(error.contains(DRACO_DECODER_PATH), "{error}");
        assert!(viewer.scene.model.is_empty());
    }

    #[test]
    fn test_missing_file_reports_error() {
        let mut viewer = Viewer::new(800, 600);

        load_into(&mut viewer, "/definitely/not/here.glb");

        assert!(viewer.status().error().is_some());
        assert!(!viewer.status().is_loading());
    }

    #[test]
    fn test_default_asset_is_bundled_in_the_binary() {
        let request = AssetRequest::parse(DEFAULT_ASSET).unwrap();
        assert!(matches!(request.location, AssetLocation::Bundled(_)));

        let model = load_model(&request).unwrap();

        assert_eq!(model.name, "lemon");
        assert!(model.bounds.is_some());
        assert!(model.triangle_count() > 0);
    }

    #[test]
    fn test_unknown_bundled_name_fails() {
        let mut viewer = Viewer::new(800, 600);

        load_into(&mut viewer, "bundled:orange.gltf");

        let error = viewer.status().error().unwrap();
        assert!(error.contains("orange.gltf"), "{error}");
        assert!(viewer.scene.model.is_empty());
    }

    #[test]
    fn test_remote_gltf_fetches_relative_buffer() {
        let (base, server) = serve_files(
            vec![
                ("/models/pillar.gltf", SPLIT_GLTF),
                ("/models/pillar.bin", SPLIT_BIN),
            ],
            2,
        );
        let mut viewer = Viewer::new(800, 600);

        load_into(&mut viewer, &format!("{base}/models/pillar.gltf"));
        let seen = server.join().unwrap();

        assert_eq!(seen, ["/models/pillar.gltf", "/models/pillar.bin"]);
        assert_eq!(viewer.status().error(), None);
        let model = viewer.scene.model.current().unwrap();
        assert_eq!(model.name, "pillar");
        assert_eq!(model.triangle_count(), 12);
    }

    #[test]
    fn test_remote_gltf_with_missing_buffer_fails() {
        let (base, server) = serve_files(vec![("/models/pillar.gltf", SPLIT_GLTF)], 2);
        let mut viewer = Viewer::new(800, 600);

        load_into(&mut viewer, &format!("{base}/models/pillar.gltf"));
        server.join().unwrap();

        let error = viewer.status().error().unwrap();
        assert!(error.contains("pillar.bin"), "{error}");
        assert!(viewer.scene.model.is_empty());
    }

    #[test]
    fn test_local_gltf_reads_sibling_buffer() {
        let request = AssetRequest::parse(SPLIT).unwrap();
        let model = load_model(&request).unwrap();

        assert_eq!(model.triangle_count(), 12);
        assert!(!model.meshes[0].has_base_color_texture);
    }

    #[test]
    fn test_base_color_texture_is_flagged() {
        let request = AssetRequest::parse(TEXTURED).unwrap();
        let model = load_model(&request).unwrap();

        let mesh = &model.meshes[0];
        assert!(mesh.has_base_color_texture);
        assert_eq!(mesh.base_color, [1.0, 0.9, 0.2, 1.0]);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut viewer = Viewer::new(800, 600);

        viewer.resize(1000, 500);
        assert_eq!(viewer.camera.aspect, 2.0);

        viewer.resize(0, 500);
        assert_eq!(viewer.camera.aspect, 2.0);
        assert_eq!(viewer.viewport(), (1000, 500));
    }

    #[test]
    fn test_first_frame_uses_nominal_step() {
        let mut viewer = Viewer::new(800, 600);
        assert_eq!(viewer.frame(), 0.016);
    }
}
