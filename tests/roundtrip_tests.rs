// tests/roundtrip_tests.rs
use cfnpath::config::Config;
use cfnpath::document::position::Position;
use cfnpath::resolve::sections::TopLevelSection;
use cfnpath::{DocumentType, PathSegment, PropertyPath, SyntaxTree};
use pretty_assertions::assert_eq;

const YAML_TEMPLATE: &str = "\
AWSTemplateFormatVersion: \"2010-09-09\"
Parameters:
  Env:
    Type: String
    AllowedValues: [dev, prod]
Conditions:
  IsProd: !Equals [!Ref Env, prod]
Resources:
  Bucket:
    Type: AWS::S3::Bucket
    Properties:
      BucketName: !Sub \"${Env}-bucket\"
      Tags:
        - Key: Team
          Value: platform
        - Key: Stage
          Value: !If [IsProd, live, test]
Outputs:
  Name:
    Value: !GetAtt Bucket.Arn
";

const JSON_TEMPLATE: &str = r#"{
  "Parameters": {
    "Env": {"Type": "String"}
  },
  "Resources": {
    "Bucket": {
      "Type": "AWS::S3::Bucket",
      "Properties": {
        "Tags": [
          {"Key": "Team", "Value": "platform"},
          {"Key": "Stage", "Value": {"Fn::If": ["IsProd", "live", "test"]}}
        ]
      }
    }
  }
}"#;

/// Every position on a non-whitespace character.
fn every_position(text: &str) -> Vec<Position> {
    text.lines()
        .enumerate()
        .flat_map(|(line, content)| {
            content
                .char_indices()
                .filter(|(_, ch)| !ch.is_whitespace())
                .map(move |(character, _)| Position::new(line, character))
        })
        .collect()
}

fn check_round_trip(tree: &SyntaxTree) {
    for position in every_position(tree.content()) {
        let (node, info) = tree.context_at(position);
        if node.is_synthetic() || info.structural {
            continue;
        }

        let found = tree.node_by_path(&info.property_path.segments);
        assert!(
            found.fully_resolved,
            "{} at {:?} did not resolve",
            info.property_path,
            position
        );

        let point = tree.lines().point_for(tree.content(), position);
        assert!(
            found.node.contains(point),
            "{} resolved to {:?}, which does not contain {:?}",
            info.property_path,
            found.node,
            position
        );
    }
}

#[test]
fn test_yaml_round_trip() {
    let tree = SyntaxTree::new(YAML_TEMPLATE, DocumentType::Yaml, Config::default()).unwrap();
    assert!(!tree.has_errors());
    check_round_trip(&tree);
}

#[test]
fn test_json_round_trip() {
    let tree = SyntaxTree::new(JSON_TEMPLATE, DocumentType::Json, Config::default()).unwrap();
    assert!(!tree.has_errors());
    check_round_trip(&tree);
}

#[test]
fn test_same_answer_from_separate_trees() {
    let first = SyntaxTree::new(YAML_TEMPLATE, DocumentType::Yaml, Config::default()).unwrap();
    let second = SyntaxTree::new(YAML_TEMPLATE, DocumentType::Yaml, Config::default()).unwrap();

    for position in every_position(YAML_TEMPLATE) {
        let (_, a) = first.context_at(position);
        let (_, b) = second.context_at(position);
        assert_eq!(a.property_path, b.property_path);
    }
}

#[test]
fn test_known_paths() {
    let tree = SyntaxTree::new(YAML_TEMPLATE, DocumentType::Yaml, Config::default()).unwrap();

    let (_, info) = tree.context_at(Position::new(16, 31));
    assert_eq!(info.property_path.to_string(), "Resources.Bucket.Properties.Tags[1].Value.Fn::If");

    let (_, info) = tree.context_at(Position::new(19, 22));
    assert_eq!(info.property_path.to_string(), "Outputs.Name.Value.Fn::GetAtt");
}

#[test]
fn test_partial_path_lookup() {
    let tree = SyntaxTree::new(JSON_TEMPLATE, DocumentType::Json, Config::default()).unwrap();
    let path: Vec<PathSegment> = vec!["Resources".into(), "Bucket".into(), "Metadata".into()];

    let found = tree.node_by_path(&path);
    assert!(!found.fully_resolved);
    assert_eq!(found.matched, 2);
    assert!(found.node.text().starts_with("\"Bucket\""));
}

#[test]
fn test_json_index_lookup() {
    let tree = SyntaxTree::new(JSON_TEMPLATE, DocumentType::Json, Config::default()).unwrap();
    let path: PropertyPath = serde_json::from_str(
        r#"["Resources", "Bucket", "Properties", "Tags", 1, "Value", "Fn::If", 2]"#,
    )
    .unwrap();

    let found = tree.node_by_path(&path.segments);
    assert!(found.fully_resolved);
    assert_eq!(found.node.text(), "\"test\"");
}

#[test]
fn test_sections_in_both_formats() {
    let yaml = SyntaxTree::new(YAML_TEMPLATE, DocumentType::Yaml, Config::default()).unwrap();
    let found = yaml.find_top_level_sections(&TopLevelSection::ALL);
    let names: Vec<_> = found.keys().map(|s| s.to_string()).collect();
    assert_eq!(
        names,
        vec!["AWSTemplateFormatVersion", "Parameters", "Conditions", "Resources", "Outputs"]
    );

    let json = SyntaxTree::new(JSON_TEMPLATE, DocumentType::Json, Config::default()).unwrap();
    let found = json.find_top_level_sections(&[TopLevelSection::Resources, TopLevelSection::Outputs]);
    assert_eq!(found.len(), 1);
    assert!(found[&TopLevelSection::Resources].text().starts_with("\"Resources\""));
}

#[test]
fn test_path_serialization() {
    let tree = SyntaxTree::new(YAML_TEMPLATE, DocumentType::Yaml, Config::default()).unwrap();
    let (_, info) = tree.context_at(Position::new(14, 18));

    let json = serde_json::to_string(&info.property_path).unwrap();
    assert_eq!(json, r#"["Resources","Bucket","Properties","Tags",0,"Value"]"#);
}
