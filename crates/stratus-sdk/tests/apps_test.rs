//! Every bundled application must build and synthesize cleanly.

use stratus_sdk::apps::SampleApp;

#[test]
fn every_sample_app_synthesizes() {
    for sample in SampleApp::ALL {
        let app = sample.build().unwrap_or_else(|e| panic!("{sample}: {e}"));
        let docs = app.synth().unwrap_or_else(|e| panic!("{sample}: {e}"));
        let units: Vec<_> = docs.iter().map(|d| d.unit.as_str()).collect();
        assert_eq!(units, sample.units(), "{sample}");
        for doc in &docs {
            assert!(!doc.resources.is_empty(), "{sample}/{} is empty", doc.unit);
        }
    }
}

#[test]
fn every_dependency_precedes_its_dependent() {
    for sample in SampleApp::ALL {
        let docs = sample.build().expect("build").synth().expect("synth");
        for doc in &docs {
            for (pos, resource) in doc.resources.iter().enumerate() {
                for dep in resource.depends_on.iter().filter(|d| !d.contains("::")) {
                    let dep_pos = doc.position(dep).expect("local dependency is present");
                    assert!(
                        dep_pos < pos,
                        "{}: {dep} must precede {}",
                        doc.unit,
                        resource.id
                    );
                }
            }
        }
    }
}

#[test]
fn sample_synthesis_is_byte_identical_across_builds() {
    for sample in SampleApp::ALL {
        let render = || -> Vec<String> {
            sample
                .build()
                .expect("build")
                .synth()
                .expect("synth")
                .iter()
                .map(|d| d.to_json().expect("json"))
                .collect()
        };
        assert_eq!(render(), render(), "{sample}");
    }
}

#[test]
fn web_tier_references_the_shared_vpc_across_units() {
    let app = SampleApp::Network.build().expect("build");
    let docs = app.synth_units(&["Web"]).expect("synth");
    assert_eq!(docs.len(), 1);

    let web = &docs[0];
    assert_eq!(web.imports, vec!["Net"]);
    let sg = web.resource("WebSecurityGroup").expect("security group");
    assert_eq!(sg.depends_on, vec!["Net::SharedVpc"]);
    assert_eq!(sg.properties["vpc"], "${Net::SharedVpc.id}");

    let server = web.resource("WebServer").expect("server");
    assert_eq!(server.depends_on, vec!["Net::SharedVpc", "WebSecurityGroup"]);
}
