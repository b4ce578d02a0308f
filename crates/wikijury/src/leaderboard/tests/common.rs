use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::leaderboard::{
    AnalysisOptions, AnalysisReport, DataType, LeaderboardEngine, RawTable, RankedTable,
};

pub(super) const EDITORS_CSV: &str = "\
username,revisions_during_project,mainspace_bytes_added,total_articles_created,total_articles_edited,references_added,upload_count,www.wikidata.org_edits,enrollment_timestamp
Alice,120,9000,2,14,8,4,2,2025-03-01T09:00:00Z
Bruno,40,3000,2,3,1,0,0,2025-03-11T09:00:00Z
Chloé,15,1000,2,1,0,1,5,2025-03-06T09:00:00Z
";

pub(super) const FRENCH_EDITORS_CSV: &str = "\
Nom d'utilisateur,Modifications pendant le projet,Octets ajoutés,Articles créés,Fichiers téléversés,Éléments Wikidata
Alice,120,9000,2,4,2
Bruno,40,3000,2,0,0
";

pub(super) const COMMONS_CSV: &str = "\
username,filename
A,x.jpg
A,y.jpg
B,z.jpg
";

pub(super) const ARTICLES_CSV: &str = "\
username,title,edit_count,characters_added,references_added,new
Alice,Lac Léman,12,5000,3,True
Alice,Rhône,3,200,0,False
Bruno,Jura,7,1600,1,oui
";

pub(super) const OVERVIEW_CSV: &str = "\
wiki,total_edits,articles_created,bytes_added,frwiki_edits,frwiki_articles_created,editors
fr.wikipedia.org,300,12,48000,300,12,9
www.wikidata.org,80,0,0,0,0,4
";

pub(super) fn raw(csv: &str) -> RawTable {
    RawTable::from_csv_reader(csv.as_bytes()).expect("fixture csv parses")
}

pub(super) fn analyze(data_type: DataType, csv: &str, options: AnalysisOptions) -> AnalysisReport {
    LeaderboardEngine::new(data_type)
        .analyze(&raw(csv), &options)
        .expect("fixture has a username column")
}

pub(super) fn ranked(report: &AnalysisReport) -> &RankedTable {
    report.ranked().expect("analysis produced a ranking")
}

pub(super) fn usernames(table: &RankedTable) -> Vec<&str> {
    table
        .contributors
        .iter()
        .map(|row| row.metrics.username.as_str())
        .collect()
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}
