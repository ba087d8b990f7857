//! Resource accessors end to end against a mock server.

mod integration;

use std::sync::{Arc, Mutex};

use eleven_rs::{
    Callbacks, LibrarySearch, MusicInput, MusicOptions, SoundEffectOptions, TtsOptions, VoiceSettings,
};
use futures::TryStreamExt;
use integration::mock_server::{EventLog, MockServerFixture};
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn text_to_speech_returns_audio_bytes() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/text-to-speech/voice123")
        .match_query(Matcher::UrlEncoded("output_format".into(), "mp3_44100_128".into()))
        .match_body(Matcher::PartialJson(json!({
            "text": "Hello world",
            "model_id": "eleven_multilingual_v2",
        })))
        .with_status(200)
        .with_header("content-type", "audio/mpeg")
        .with_body("audio data")
        .create_async()
        .await;

    let costs = Arc::new(Mutex::new(Vec::new()));
    let c = costs.clone();
    let callbacks = Callbacks::new().on_audio_generated(move |e| {
        c.lock().unwrap().push(e.cost_info.character_count);
        Ok(())
    });
    let client = fixture.client_with(|cfg| cfg.with_callbacks(callbacks));

    let audio = client
        .generate_speech("Hello world", "voice123", &TtsOptions::new())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(audio.bytes(), 10);
    assert_eq!(audio.format, "mp3_44100_128");
    assert_eq!(audio.voice_id.as_deref(), Some("voice123"));
    assert_eq!(audio.text.as_deref(), Some("Hello world"));
    assert_eq!(&audio.data[..], b"audio data");
    assert_eq!(*costs.lock().unwrap(), vec![11]);
}

#[tokio::test]
async fn text_to_speech_sends_custom_format_and_settings() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/text-to-speech/voice123")
        .match_query(Matcher::UrlEncoded("output_format".into(), "pcm_16000".into()))
        .match_body(Matcher::PartialJson(json!({
            "model_id": "eleven_turbo_v2_5",
            "voice_settings": {"stability": 0.2},
        })))
        .with_status(200)
        .with_body(vec![0u8; 32])
        .create_async()
        .await;

    let options = TtsOptions::new()
        .model_id("eleven_turbo_v2_5")
        .output_format("pcm_16000")
        .voice_settings(VoiceSettings::default().stability(0.2));
    let audio = fixture
        .client()
        .tts()
        .generate("Hi", "voice123", &options)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(audio.bytes(), 32);
    assert_eq!(audio.extension(), "pcm");
}

#[tokio::test]
async fn blank_text_is_rejected_without_a_request() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = fixture
        .client()
        .generate_speech("   ", "voice123", &TtsOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.class(), "validation");
    mock.assert_async().await;
}

#[tokio::test]
async fn voices_list_and_filter() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_json(
            "GET",
            "/voices",
            200,
            r#"{"voices":[
                {"voice_id":"a","name":"Rachel","category":"premade","labels":{"gender":"female","accent":"american"}},
                {"voice_id":"b","name":"Adam","category":"cloned","labels":{"gender":"male","accent":"british"}}
            ]}"#,
        )
        .await;

    let voices = fixture.client().voices().list().await.unwrap();

    assert_eq!(voices.len(), 2);
    assert_eq!(voices.find_by_name("rachel").unwrap().voice_id, "a");
    assert_eq!(voices.by_gender("male").len(), 1);
    assert_eq!(voices.by_accent("brit").len(), 1);
    assert_eq!(voices.by_category("premade").len(), 1);
    assert_eq!(voices.voice_ids(), vec!["a", "b"]);
}

#[tokio::test]
async fn voice_delete_reports_confirmation() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_json("DELETE", "/voices/a", 200, r#"{"status":"ok"}"#)
        .await;
    fixture
        .mock_json("DELETE", "/voices/b", 200, r#"{"status":"error"}"#)
        .await;
    let log = EventLog::default();
    let client = fixture.client_with(|c| c.with_callbacks(log.callbacks()));

    assert!(client.voices().delete("a").await.unwrap());
    assert!(!client.voices().delete("b").await.unwrap());
    assert_eq!(log.count("voice_deleted"), 2);
}

#[tokio::test]
async fn voice_settings_round_trip() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_json(
            "GET",
            "/voices/a/settings",
            200,
            r#"{"stability":0.4,"similarity_boost":0.8,"style":0.0,"use_speaker_boost":true}"#,
        )
        .await;
    let update = fixture
        .server
        .mock("POST", "/voices/a/settings/edit")
        .match_body(Matcher::Json(json!({"stability": 0.9})))
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;
    let client = fixture.client();

    let settings = client.voices().settings("a").await.unwrap();
    assert_eq!(settings.stability, Some(0.4));
    assert_eq!(settings.use_speaker_boost, Some(true));

    let ok = client
        .voices()
        .update_settings("a", &VoiceSettings::default().stability(0.9))
        .await
        .unwrap();
    assert!(ok);
    update.assert_async().await;
}

#[tokio::test]
async fn library_search_sends_filters() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/shared-voices")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page_size".into(), "100".into()),
            Matcher::UrlEncoded("gender".into(), "female".into()),
            Matcher::UrlEncoded("use_cases".into(), "narration,audiobook".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"voices":[{"public_owner_id":"owner1","voice_id":"lib1","name":"Narrator","usage_character_count_30d":20000}],"has_more":false}"#,
        )
        .create_async()
        .await;

    let search = LibrarySearch::new()
        .page_size(500)
        .gender("female")
        .use_cases(["narration", "audiobook"]);
    let page = fixture.client().voice_library().search(&search).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page.voices.len(), 1);
    assert!(!page.has_more);
    assert_eq!(page.popular(10_000).len(), 1);
}

#[tokio::test]
async fn library_pages_follow_the_cursor() {
    let mut fixture = MockServerFixture::new().await;
    let first = fixture
        .server
        .mock("GET", "/shared-voices")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"voices":[{"public_owner_id":"o","voice_id":"v1"}],"has_more":true,"last_sort_id":"cursor-1"}"#,
        )
        .expect(1)
        .create_async()
        .await;
    let second = fixture
        .server
        .mock("GET", "/shared-voices")
        .match_query(Matcher::UrlEncoded("cursor".into(), "cursor-1".into()))
        .with_status(200)
        .with_body(r#"{"voices":[{"public_owner_id":"o","voice_id":"v2"}],"has_more":false}"#)
        .expect(1)
        .create_async()
        .await;
    let client = fixture.client();

    let pages: Vec<_> = client
        .voice_library()
        .pages(LibrarySearch::new())
        .try_collect()
        .await
        .unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].voices[0].voice_id, "v2");
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn library_add_emits_voice_added() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/voices/add/owner1/lib1")
        .match_body(Matcher::Json(json!({"new_name": "Narrator"})))
        .with_status(200)
        .with_body(r#"{"voice_id":"acct1"}"#)
        .create_async()
        .await;
    let log = EventLog::default();
    let client = fixture.client_with(|c| c.with_callbacks(log.callbacks()));

    let voice = client
        .voice_library()
        .add("owner1", "lib1", "Narrator")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(voice.voice_id, "acct1");
    assert_eq!(voice.name.as_deref(), Some("Narrator"));
    assert_eq!(log.count("voice_added"), 1);
}

#[tokio::test]
async fn models_filtering() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_json(
            "GET",
            "/models",
            200,
            r#"[
                {"model_id":"eleven_multilingual_v2","can_do_text_to_speech":true,
                 "languages":[{"language_id":"en","name":"English"},{"language_id":"de","name":"German"}]},
                {"model_id":"eleven_turbo_v2_5","can_do_text_to_speech":true,
                 "languages":[{"language_id":"en","name":"English"}]}
            ]"#,
        )
        .await;
    let client = fixture.client();
    let models = client.models();

    assert_eq!(models.ids().await.unwrap().len(), 2);
    assert_eq!(models.multilingual().await.unwrap().len(), 1);
    assert_eq!(models.turbo().await.unwrap()[0].model_id, "eleven_turbo_v2_5");
    assert!(models.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn subscription_usage_arithmetic() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_json(
            "GET",
            "/user/subscription",
            200,
            r#"{"tier":"creator","character_count":2500,"character_limit":10000,"voice_limit":3,"status":"active"}"#,
        )
        .await;
    let client = fixture.client();
    let user = client.user();

    let usage = user.character_usage().await.unwrap();
    assert_eq!(usage.remaining, 7500);
    assert_eq!(usage.percentage, 25.0);
    assert!(user.can_add_voice(2).await.unwrap());
    assert!(!user.can_add_voice(3).await.unwrap());

    let sub = user.subscription_with_voice_count(1).await.unwrap();
    assert_eq!(sub.voice_slots_available(), Some(2));
}

#[tokio::test]
async fn sound_effect_renames_loop_field() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/sound-generation")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "text": "door creak",
            "loop": true,
            "duration_seconds": 2.5,
        })))
        .with_status(200)
        .with_body("creak")
        .create_async()
        .await;

    let audio = fixture
        .client()
        .generate_sound_effect(
            "door creak",
            &SoundEffectOptions::new().looping(true).duration_seconds(2.5),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(audio.bytes(), 5);
}

#[tokio::test]
async fn music_generation_and_plan() {
    let mut fixture = MockServerFixture::new().await;
    let compose = fixture
        .server
        .mock("POST", "/music")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "prompt": "calm piano",
            "music_length_ms": 10000,
        })))
        .with_status(200)
        .with_body("notes")
        .create_async()
        .await;
    let plan = fixture
        .mock_json("POST", "/music/plan", 200, r#"{"sections":[{"section_name":"intro"}]}"#)
        .await;
    let client = fixture.client();

    let audio = client
        .generate_music(
            &MusicInput::prompt("calm piano"),
            &MusicOptions::new().music_length_ms(10_000),
        )
        .await
        .unwrap();
    assert_eq!(audio.bytes(), 5);

    let composition = client
        .music()
        .create_plan("calm piano", Some(10_000), None)
        .await
        .unwrap();
    assert_eq!(composition["sections"][0]["section_name"], "intro");

    compose.assert_async().await;
    plan.assert_async().await;
}
