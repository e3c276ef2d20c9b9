//! Fixture builders shared by the integration tests
#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::Path;
use tolldata_etl::config::{EtlConfig, JoinMode};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ARCHIVE_PATH: &str = "/labs/tolldata.tgz";

pub const TRANSFORMED_HEADER: &str = "Rowid,Timestamp,Anonymized Vehicle number,VehicleType,\
Number of axles,Tollplaza id,Tollplaza code,Type of Payment code,Vehicle Code";

/// Gzip-compressed tarball holding `files`
pub fn build_tgz(files: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *contents)
            .expect("Failed to append tar entry");
    }
    builder
        .into_inner()
        .expect("Failed to finish tar")
        .finish()
        .expect("Failed to finish gzip")
}

/// One fixed-width payment row with the codes at their byte offsets
pub fn payment_row(row_id: u32, payment_code: &str, vehicle_code: &str) -> String {
    assert_eq!(payment_code.len(), 3);
    assert_eq!(vehicle_code.len(), 5);
    let prefix = format!("{:>6} Thu Aug 19 21:54:38 2021  125094 PC7C042B7", row_id);
    format!("{:<61}{} {}\n", prefix, payment_code, vehicle_code)
}

pub struct Fixture {
    pub vehicle: String,
    pub plaza: String,
    pub payment: String,
}

impl Fixture {
    /// Two aligned rows, a car and a truck
    pub fn two_rows() -> Self {
        Self {
            vehicle: "1,Thu Aug 19 21:54:38 2021,125094,car,2,VC965\n\
                      2,Sat Jul 31 04:09:44 2021,174434,truck,4,VC965\n"
                .to_string(),
            plaza: "2\t4856\tPC7C042B7\n4\t4154\tPC2C2EF9E\n".to_string(),
            payment: format!("{}{}", payment_row(1, "PTE", "VC965"), payment_row(2, "PTP", "VC965")),
        }
    }

    /// Toll plaza data one row short of the others
    pub fn misaligned() -> Self {
        Self {
            plaza: "2\t4856\tPC7C042B7\n".to_string(),
            ..Self::two_rows()
        }
    }

    pub fn archive(&self) -> Vec<u8> {
        build_tgz(&[
            ("vehicle-data.csv", self.vehicle.as_bytes()),
            ("tollplaza-data.tsv", self.plaza.as_bytes()),
            ("payment-data.txt", self.payment.as_bytes()),
            ("fileformats.txt", b"field layouts\n"),
        ])
    }
}

/// Serve `body` at [`ARCHIVE_PATH`] for every request
pub async fn serve_archive(server: &MockServer, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(ARCHIVE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

pub fn archive_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), ARCHIVE_PATH)
}

/// Configuration pointed at a mock server, retrying without delay
pub fn test_config(staging_dir: &Path, source_url: String, retries: u32) -> EtlConfig {
    EtlConfig {
        source_url,
        staging_dir: staging_dir.to_path_buf(),
        retries,
        retry_delay_secs: 0,
        http_timeout_secs: 10,
        join_mode: JoinMode::Positional,
        show_progress: false,
    }
}
